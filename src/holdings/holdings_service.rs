use std::sync::Arc;

use log::info;

use super::holdings_errors::{HoldingError, Result};
use super::holdings_model::{Holding, HoldingKind, NewHolding};
use super::holdings_repository::HoldingRepository;
use crate::db::DbPool;

/// Service for managing stock and crypto holdings
pub struct HoldingService {
    pool: Arc<DbPool>,
}

impl HoldingService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Adds a holding, replacing quantity and purchase price when the user
    /// already holds the symbol. Symbols are normalized to upper case.
    pub fn add_holding(&self, mut new_holding: NewHolding) -> Result<Holding> {
        new_holding.validate()?;
        new_holding.symbol = new_holding.symbol.trim().to_uppercase();

        let repo = HoldingRepository::new(self.pool.clone());
        repo.upsert(&new_holding)?;

        info!(
            "Recorded {} holding of {} {}",
            new_holding.kind.as_str(),
            new_holding.quantity,
            new_holding.symbol
        );

        // Read back the stored row so the caller sees the preserved price cache.
        repo.list_for_user(new_holding.user_id, new_holding.kind)?
            .into_iter()
            .find(|h| h.symbol == new_holding.symbol)
            .ok_or_else(|| {
                HoldingError::NotFound(format!(
                    "Holding {} not found after upsert",
                    new_holding.symbol
                ))
            })
    }

    pub fn list_holdings(&self, user_id: i32, kind: HoldingKind) -> Result<Vec<Holding>> {
        let repo = HoldingRepository::new(self.pool.clone());
        repo.list_for_user(user_id, kind)
    }

    pub fn distinct_symbols(&self, user_id: i32, kind: HoldingKind) -> Result<Vec<String>> {
        let repo = HoldingRepository::new(self.pool.clone());
        repo.distinct_symbols(user_id, kind)
    }
}
