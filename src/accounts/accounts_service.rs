use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use super::accounts_errors::{AccountError, Result};
use super::accounts_model::{
    Account, AccountDB, AccountKind, AccountKindSummary, AccountPayload, NewManualAccount,
};
use super::accounts_repository::AccountRepository;
use crate::db::DbPool;
use crate::transactions::{Transaction, TransactionRepository};
use crate::vault::CredentialVault;

/// Service for reading and creating account records. All balance data lives
/// in sealed payloads, so every read path goes through the vault.
pub struct AccountService {
    pool: Arc<DbPool>,
    vault: Arc<CredentialVault>,
}

impl AccountService {
    pub fn new(pool: Arc<DbPool>, vault: Arc<CredentialVault>) -> Self {
        Self { pool, vault }
    }

    /// Creates a manually entered account with a sealed payload.
    pub fn add_manual_account(&self, new_account: NewManualAccount) -> Result<Account> {
        new_account.validate()?;

        let payload = AccountPayload {
            balance: new_account.balance,
            currency: new_account.currency,
            institution: new_account.institution,
            account_number: new_account.account_number,
            last_api_update: None,
        };
        let sealed = self
            .vault
            .seal_json(&payload)
            .map_err(|e| AccountError::Vault(e.to_string()))?;

        let now = chrono::Utc::now().naive_utc();
        let account_db = AccountDB {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_account.user_id,
            name: new_account.name,
            account_kind: new_account.kind.as_str().to_string(),
            encrypted_payload: sealed,
            created_at: now,
            updated_at: now,
        };

        let repo = AccountRepository::new(self.pool.clone());
        repo.insert(&account_db)?;

        Ok(Account {
            id: account_db.id,
            user_id: account_db.user_id,
            name: account_db.name,
            kind: new_account.kind,
            payload,
            created_at: account_db.created_at,
            updated_at: account_db.updated_at,
        })
    }

    /// Lists a user's accounts with decrypted payloads. Records whose payload
    /// no longer opens are omitted and logged rather than failing the whole
    /// listing.
    pub fn list_accounts(&self, user_id: i32) -> Result<Vec<Account>> {
        let repo = AccountRepository::new(self.pool.clone());
        let records = repo.list_for_user(user_id)?;

        let mut accounts = Vec::with_capacity(records.len());
        for record in records {
            match self.decrypt_account(record) {
                Ok(account) => accounts.push(account),
                Err(e) => warn!("Skipping unreadable account record: {}", e),
            }
        }
        Ok(accounts)
    }

    /// Per-kind count and balance rollup, decrypting each payload. Corrupt
    /// records are skipped.
    pub fn account_summary(&self, user_id: i32) -> Result<HashMap<AccountKind, AccountKindSummary>> {
        let mut summary: HashMap<AccountKind, AccountKindSummary> = HashMap::new();
        for account in self.list_accounts(user_id)? {
            let entry = summary.entry(account.kind).or_default();
            entry.count += 1;
            entry.total_balance += account.payload.balance;
        }
        Ok(summary)
    }

    /// Loads one account with its most recent transactions, categories
    /// decrypted where possible.
    pub fn get_account_with_transactions(
        &self,
        user_id: i32,
        account_id: &str,
        limit: i64,
    ) -> Result<(Account, Vec<Transaction>)> {
        let repo = AccountRepository::new(self.pool.clone());
        let account = self.decrypt_account(repo.get_for_user(user_id, account_id)?)?;

        let tx_repo = TransactionRepository::new(self.pool.clone());
        let transactions = tx_repo
            .list_for_account(account_id, Some(limit))
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?
            .into_iter()
            .map(|t| t.into_domain(&self.vault))
            .collect();

        Ok((account, transactions))
    }

    fn decrypt_account(&self, record: AccountDB) -> Result<Account> {
        let kind: AccountKind = record.account_kind.parse()?;
        let payload: AccountPayload = self
            .vault
            .open_json(&record.encrypted_payload)
            .map_err(|e| AccountError::Vault(e.to_string()))?;

        Ok(Account {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            kind,
            payload,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
