//! Presenza Server - location-based attendance tracking

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presenza_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("presenza_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Presenza Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool.clone());
    let services = Services::new(repository, config.auth.clone(), config.face.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        pool,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/face", post(api::auth::register_face))
        // Events
        .route("/events", get(api::events::list_events))
        .route("/events", post(api::events::create_event))
        .route("/events/:id", get(api::events::get_event))
        .route("/events/:id", delete(api::events::delete_event))
        .route("/events/:id/deactivate", put(api::events::deactivate_event))
        // Departments
        .route("/departments", get(api::events::list_departments))
        .route("/departments", post(api::events::create_department))
        .route("/departments/:id", put(api::events::update_department))
        .route("/departments/:id", delete(api::events::delete_department))
        // Enrollments
        .route("/enrollments", get(api::enrollments::list_my_enrollments))
        .route("/enrollments", post(api::enrollments::request_enrollment))
        .route("/enrollments/:id", delete(api::enrollments::cancel_enrollment))
        .route(
            "/enrollments/pending/:department_id",
            get(api::enrollments::list_pending),
        )
        .route(
            "/enrollments/approved/:department_id",
            get(api::enrollments::list_approved),
        )
        .route(
            "/enrollments/:id/review",
            put(api::enrollments::review_enrollment),
        )
        // Admin
        .route("/admin/users", get(api::users::list_users))
        .route("/admin/users/:id", get(api::users::get_user))
        .route("/admin/users/:id", put(api::users::update_user))
        // Attendance
        .route("/attendance/checkin", post(api::attendance::check_in))
        .route("/attendance/checkout", post(api::attendance::check_out))
        .route("/attendance/status/:event_id", get(api::attendance::get_status))
        .route("/attendance/history", get(api::attendance::history))
        .route(
            "/attendance/event/:event_id",
            get(api::attendance::event_attendance),
        )
        .route(
            "/attendance/event/:event_id/finalize",
            post(api::attendance::finalize),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
