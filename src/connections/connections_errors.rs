use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for provider-connection operations
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Unsupported provider kind: {0}")]
    UnsupportedKind(String),
    #[error("Credential vault error: {0}")]
    Vault(String),
}

impl From<DieselError> for ConnectionError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => ConnectionError::NotFound("Record not found".to_string()),
            _ => ConnectionError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for connection operations
pub type Result<T> = std::result::Result<T, ConnectionError>;
