use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for TransactionError {
    fn from(err: DieselError) -> Self {
        TransactionError::DatabaseError(err.to_string())
    }
}

/// Result type for transaction operations
pub type Result<T> = std::result::Result<T, TransactionError>;
