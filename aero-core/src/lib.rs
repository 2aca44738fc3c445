pub mod account;
pub mod booking;
pub mod catalog;
pub mod repository;
pub mod schedule_days;
pub mod search;
pub mod source;
pub mod whitelist;

pub use schedule_days::DaysOfWeek;
pub use source::{DataSource, SourceScope, Sources};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),
    #[error("Access denied: {0}")]
    AuthorizationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &str) -> Self {
        CoreError::NotFoundError(format!("{} not found", entity))
    }

    /// The message a client is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            CoreError::ValidationError(msg)
            | CoreError::NotFoundError(msg)
            | CoreError::ConflictError(msg)
            | CoreError::AuthenticationError(msg)
            | CoreError::AuthorizationError(msg) => msg.clone(),
            CoreError::InternalError(_) => "Internal Server Error".to_string(),
        }
    }
}
