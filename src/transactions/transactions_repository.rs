use std::sync::Arc;

use diesel::prelude::*;

use super::transactions_errors::{Result, TransactionError};
use super::transactions_model::TransactionDB;
use crate::db::{get_connection, DbPool};
use crate::schema::transactions;
use crate::schema::transactions::dsl::*;

/// Repository for transaction records. Transactions are insert-if-absent,
/// never updated.
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Inserts the given rows, silently skipping any row whose natural key
    /// (account, amount, description, type, date) already exists. Returns the
    /// number of rows actually inserted.
    pub fn insert_if_absent(&self, rows: &[TransactionDB]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let inserted = diesel::insert_or_ignore_into(transactions::table)
            .values(rows)
            .execute(&mut conn)?;

        Ok(inserted)
    }

    /// Most recent transactions for one account, newest first.
    pub fn list_for_account(
        &self,
        account: &str,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionDB>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let mut query = transactions::table
            .filter(account_id.eq(account))
            .order(date.desc())
            .into_boxed();

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .load::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)
    }

    pub fn count_for_account(&self, account: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions::table
            .filter(account_id.eq(account))
            .count()
            .get_result(&mut conn)
            .map_err(TransactionError::from)
    }
}
