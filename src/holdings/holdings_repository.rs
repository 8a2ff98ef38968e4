use std::sync::Arc;

use diesel::prelude::*;

use super::holdings_errors::{HoldingError, Result};
use super::holdings_model::{Holding, HoldingKind, HoldingRow, NewHolding};
use crate::db::{get_connection, DbPool};

/// Repository for the per-class holdings tables. Stock and crypto rows share
/// a shape but live in separate tables, so each operation dispatches on the
/// holding kind.
pub struct HoldingRepository {
    pool: Arc<DbPool>,
}

impl HoldingRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Inserts a holding, or replaces quantity and purchase price when the
    /// (user, symbol) pair already exists. The cached current price is left
    /// alone; the next market-data pass refreshes it.
    pub fn upsert(&self, new_holding: &NewHolding) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| HoldingError::DatabaseError(e.to_string()))?;

        let now = chrono::Utc::now().naive_utc();
        let new_id = uuid::Uuid::new_v4().to_string();

        match new_holding.kind {
            HoldingKind::Stock => {
                use crate::schema::stock_holdings::dsl::*;
                diesel::insert_into(stock_holdings)
                    .values((
                        id.eq(&new_id),
                        user_id.eq(new_holding.user_id),
                        symbol.eq(&new_holding.symbol),
                        quantity.eq(new_holding.quantity),
                        purchase_price.eq(new_holding.purchase_price),
                        last_updated.eq(now),
                    ))
                    .on_conflict((user_id, symbol))
                    .do_update()
                    .set((
                        quantity.eq(new_holding.quantity),
                        purchase_price.eq(new_holding.purchase_price),
                        last_updated.eq(now),
                    ))
                    .execute(&mut conn)?;
            }
            HoldingKind::Crypto => {
                use crate::schema::crypto_holdings::dsl::*;
                diesel::insert_into(crypto_holdings)
                    .values((
                        id.eq(&new_id),
                        user_id.eq(new_holding.user_id),
                        symbol.eq(&new_holding.symbol),
                        quantity.eq(new_holding.quantity),
                        purchase_price.eq(new_holding.purchase_price),
                        last_updated.eq(now),
                    ))
                    .on_conflict((user_id, symbol))
                    .do_update()
                    .set((
                        quantity.eq(new_holding.quantity),
                        purchase_price.eq(new_holding.purchase_price),
                        last_updated.eq(now),
                    ))
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }

    pub fn list_for_user(&self, user: i32, kind: HoldingKind) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| HoldingError::DatabaseError(e.to_string()))?;

        let rows = match kind {
            HoldingKind::Stock => {
                use crate::schema::stock_holdings::dsl::*;
                stock_holdings
                    .filter(user_id.eq(user))
                    .order(symbol.asc())
                    .load::<HoldingRow>(&mut conn)?
            }
            HoldingKind::Crypto => {
                use crate::schema::crypto_holdings::dsl::*;
                crypto_holdings
                    .filter(user_id.eq(user))
                    .order(symbol.asc())
                    .load::<HoldingRow>(&mut conn)?
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| Holding::from_row(row, kind))
            .collect())
    }

    /// Distinct held symbols for one user and asset class.
    pub fn distinct_symbols(&self, user: i32, kind: HoldingKind) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| HoldingError::DatabaseError(e.to_string()))?;

        let symbols = match kind {
            HoldingKind::Stock => {
                use crate::schema::stock_holdings::dsl::*;
                stock_holdings
                    .filter(user_id.eq(user))
                    .select(symbol)
                    .distinct()
                    .load::<String>(&mut conn)?
            }
            HoldingKind::Crypto => {
                use crate::schema::crypto_holdings::dsl::*;
                crypto_holdings
                    .filter(user_id.eq(user))
                    .select(symbol)
                    .distinct()
                    .load::<String>(&mut conn)?
            }
        };

        Ok(symbols)
    }

    /// Overwrites only the cached price and refresh timestamp for one symbol.
    /// Returns the number of rows touched (0 when the user does not hold the
    /// symbol).
    pub fn update_price(
        &self,
        user: i32,
        kind: HoldingKind,
        held_symbol: &str,
        price: f64,
    ) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| HoldingError::DatabaseError(e.to_string()))?;

        let now = chrono::Utc::now().naive_utc();

        let affected = match kind {
            HoldingKind::Stock => {
                use crate::schema::stock_holdings::dsl::*;
                diesel::update(
                    stock_holdings
                        .filter(user_id.eq(user))
                        .filter(symbol.eq(held_symbol)),
                )
                .set((current_price.eq(price), last_updated.eq(now)))
                .execute(&mut conn)?
            }
            HoldingKind::Crypto => {
                use crate::schema::crypto_holdings::dsl::*;
                diesel::update(
                    crypto_holdings
                        .filter(user_id.eq(user))
                        .filter(symbol.eq(held_symbol)),
                )
                .set((current_price.eq(price), last_updated.eq(now)))
                .execute(&mut conn)?
            }
        };

        Ok(affected)
    }
}
