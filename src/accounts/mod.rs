pub mod accounts_errors;
pub mod accounts_model;
pub mod accounts_repository;
pub mod accounts_service;

pub use accounts_errors::{AccountError, Result};
pub use accounts_model::{
    Account, AccountDB, AccountKind, AccountKindSummary, AccountPayload, NewManualAccount,
};
pub use accounts_repository::AccountRepository;
pub use accounts_service::AccountService;
