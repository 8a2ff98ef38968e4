use std::sync::Arc;

use diesel::prelude::*;

use super::accounts_errors::{AccountError, Result};
use super::accounts_model::AccountDB;
use crate::db::{get_connection, DbPool};
use crate::schema::accounts;
use crate::schema::accounts::dsl::*;
use crate::vault::EncryptedBlob;

/// Repository for managing account records in the database
pub struct AccountRepository {
    pool: Arc<DbPool>,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub fn insert(&self, account_db: &AccountDB) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        diesel::insert_into(accounts::table)
            .values(account_db)
            .execute(&mut conn)?;

        Ok(())
    }

    /// Looks up the reconciliation join key (user, display name).
    pub fn find_by_user_and_name(
        &self,
        user: i32,
        account_name: &str,
    ) -> Result<Option<AccountDB>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        accounts::table
            .filter(user_id.eq(user))
            .filter(name.eq(account_name))
            .first::<AccountDB>(&mut conn)
            .optional()
            .map_err(AccountError::from)
    }

    /// Overwrites the sealed payload and bumps the updated timestamp. Prior
    /// balance history is not retained.
    pub fn update_payload(&self, account_id: &str, payload: &EncryptedBlob) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(accounts::table.filter(id.eq(account_id)))
            .set((
                encrypted_payload.eq(payload),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(AccountError::NotFound(format!(
                "Account with id {} not found",
                account_id
            )));
        }

        Ok(())
    }

    pub fn list_for_user(&self, user: i32) -> Result<Vec<AccountDB>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        accounts::table
            .filter(user_id.eq(user))
            .order(name.asc())
            .load::<AccountDB>(&mut conn)
            .map_err(AccountError::from)
    }

    pub fn get_for_user(&self, user: i32, account_id: &str) -> Result<AccountDB> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        accounts::table
            .filter(id.eq(account_id))
            .filter(user_id.eq(user))
            .first::<AccountDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })
    }

    pub fn count_for_user(&self, user: i32) -> Result<i64> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        accounts::table
            .filter(user_id.eq(user))
            .count()
            .get_result(&mut conn)
            .map_err(AccountError::from)
    }
}
