pub mod connections_errors;
pub mod connections_model;
pub mod connections_repository;
pub mod connections_service;

pub use connections_errors::{ConnectionError, Result};
pub use connections_model::{ApiConnection, ApiConnectionDB, NewConnection, ProviderKind};
pub use connections_repository::ConnectionRepository;
pub use connections_service::ConnectionService;
