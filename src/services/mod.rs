use thiserror::Error;

pub mod backup;
pub mod demo;
pub mod matches;
pub mod players;
pub mod server;
pub mod stats;
pub mod training;

/// Fresh bearer token for a tenant
pub fn new_api_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Failures that are the caller's fault rather than the database's
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
}
