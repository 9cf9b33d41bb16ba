//! Data models for Presenza entities

pub mod attendance;
pub mod department;
pub mod enrollment;
pub mod event;
pub mod user;
