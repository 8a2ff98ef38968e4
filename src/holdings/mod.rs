pub mod holdings_errors;
pub mod holdings_model;
pub mod holdings_repository;
pub mod holdings_service;

pub use holdings_errors::{HoldingError, Result};
pub use holdings_model::{Holding, HoldingKind, NewHolding};
pub use holdings_repository::HoldingRepository;
pub use holdings_service::HoldingService;
