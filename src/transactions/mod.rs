pub mod transactions_errors;
pub mod transactions_model;
pub mod transactions_repository;

pub use transactions_errors::{Result, TransactionError};
pub use transactions_model::{Transaction, TransactionDB, TransactionDirection};
pub use transactions_repository::TransactionRepository;
