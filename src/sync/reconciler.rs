use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::accounts::{AccountDB, AccountPayload, AccountRepository};
use crate::db::DbPool;
use crate::errors::Result;
use crate::holdings::{HoldingKind, HoldingRepository};
use crate::providers::{NormalizedAccount, NormalizedTransaction, Quote};
use crate::transactions::{TransactionDB, TransactionRepository};
use crate::vault::{CredentialVault, EncryptedBlob};

/// Idempotent merge of freshly fetched provider data into the store.
pub struct Reconciler {
    pool: Arc<DbPool>,
    vault: Arc<CredentialVault>,
}

impl Reconciler {
    pub fn new(pool: Arc<DbPool>, vault: Arc<CredentialVault>) -> Self {
        Self { pool, vault }
    }

    /// Matches an incoming account onto an existing record by
    /// (user, display name). A hit overwrites the sealed payload in place; a
    /// miss inserts a new record. Returns the id of the record written.
    pub fn upsert_account(&self, user_id: i32, incoming: &NormalizedAccount) -> Result<String> {
        let payload = AccountPayload {
            balance: incoming.balance,
            currency: incoming.currency.clone(),
            institution: incoming.institution.clone(),
            account_number: None,
            last_api_update: Some(chrono::Utc::now().naive_utc()),
        };
        let sealed = self.vault.seal_json(&payload)?;

        let repo = AccountRepository::new(self.pool.clone());
        match repo.find_by_user_and_name(user_id, &incoming.name)? {
            Some(existing) => {
                debug!("Updating existing account '{}'", incoming.name);
                repo.update_payload(&existing.id, &sealed)?;
                Ok(existing.id)
            }
            None => {
                debug!("Creating account '{}'", incoming.name);
                let now = chrono::Utc::now().naive_utc();
                let account_db = AccountDB {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id,
                    name: incoming.name.clone(),
                    account_kind: incoming.kind.as_str().to_string(),
                    encrypted_payload: sealed,
                    created_at: now,
                    updated_at: now,
                };
                repo.insert(&account_db)?;
                Ok(account_db.id)
            }
        }
    }

    /// Inserts transactions that are not already present, keyed on
    /// (account, amount, description, type, date). Categories are sealed
    /// individually when present; an absent category is stored as the empty
    /// sentinel rather than a blob. Returns the number of rows inserted.
    pub fn insert_transactions_if_absent(
        &self,
        account_id: &str,
        incoming: &[NormalizedTransaction],
    ) -> Result<usize> {
        let now = chrono::Utc::now().naive_utc();

        let mut rows = Vec::with_capacity(incoming.len());
        for transaction in incoming {
            let encrypted_category = if transaction.category.is_empty() {
                EncryptedBlob::empty()
            } else {
                self.vault.seal_json(&transaction.category)?
            };

            rows.push(TransactionDB {
                id: uuid::Uuid::new_v4().to_string(),
                account_id: account_id.to_string(),
                amount: transaction.amount,
                description: transaction.description.clone(),
                transaction_type: transaction.direction.as_str().to_string(),
                date: transaction.date,
                encrypted_category,
                created_at: now,
            });
        }

        let repo = TransactionRepository::new(self.pool.clone());
        let inserted = repo.insert_if_absent(&rows)?;
        debug!(
            "Inserted {} of {} fetched transactions for account {}",
            inserted,
            incoming.len(),
            account_id
        );
        Ok(inserted)
    }

    /// Overwrites the cached price on every holding whose symbol appears in
    /// the quote map. Holdings absent from the map keep their previous price;
    /// they are stale, not deleted. Returns the number of rows refreshed.
    pub fn refresh_holding_prices(
        &self,
        user_id: i32,
        kind: HoldingKind,
        quotes: &HashMap<String, Quote>,
    ) -> Result<usize> {
        let repo = HoldingRepository::new(self.pool.clone());
        let mut refreshed = 0;
        for (symbol, quote) in quotes {
            refreshed += repo.update_price(user_id, kind, symbol, quote.price)?;
        }
        debug!("Refreshed {} {} holding prices", refreshed, kind.as_str());
        Ok(refreshed)
    }
}
