//! Face verification oracle
//!
//! The attendance core consumes face matching as an opaque oracle: extract
//! an embedding from a submitted sample, compare it against the student's
//! registered reference. The production matcher works on embeddings the
//! client-side extractor ships as JSON float arrays; accuracy tuning of the
//! upstream extractor is out of scope here.

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

/// Pluggable face matching oracle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceMatcher: Send + Sync {
    /// Extract an embedding from a raw sample.
    ///
    /// Fails with `NoFaceDetected` when the sample holds no usable
    /// embedding and `MultipleFacesDetected` when it is ambiguous.
    fn extract(&self, sample: &[u8]) -> AppResult<Vec<f32>>;

    /// Compare a stored reference against a fresh candidate.
    ///
    /// Comparison is CPU-bound and runs off the async executor so a slow
    /// match never stalls concurrent requests.
    async fn compare(&self, reference: Vec<f32>, candidate: Vec<f32>) -> AppResult<bool>;
}

/// Cosine-similarity matcher over client-extracted embeddings
#[derive(Clone)]
pub struct CosineFaceMatcher {
    tolerance: f32,
}

impl CosineFaceMatcher {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }
}

#[async_trait]
impl FaceMatcher for CosineFaceMatcher {
    fn extract(&self, sample: &[u8]) -> AppResult<Vec<f32>> {
        let parsed: serde_json::Value = serde_json::from_slice(sample)
            .map_err(|_| AppError::NoFaceDetected)?;

        // A sample containing several embeddings means the capture saw
        // more than one face.
        let embedding = match parsed {
            serde_json::Value::Array(ref items)
                if items.iter().all(|v| v.is_array()) && !items.is_empty() =>
            {
                if items.len() > 1 {
                    return Err(AppError::MultipleFacesDetected);
                }
                serde_json::from_value::<Vec<f32>>(items[0].clone())
                    .map_err(|_| AppError::NoFaceDetected)?
            }
            value => serde_json::from_value::<Vec<f32>>(value)
                .map_err(|_| AppError::NoFaceDetected)?,
        };

        if embedding.is_empty() {
            return Err(AppError::NoFaceDetected);
        }

        Ok(embedding)
    }

    async fn compare(&self, reference: Vec<f32>, candidate: Vec<f32>) -> AppResult<bool> {
        let tolerance = self.tolerance;
        let matched = tokio::task::spawn_blocking(move || {
            cosine_similarity(&reference, &candidate) >= tolerance
        })
        .await
        .map_err(|e| AppError::Internal(format!("face comparison task failed: {}", e)))?;

        Ok(matched)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
