use std::sync::Arc;

use log::{error, info, warn};

use super::reconciler::Reconciler;
use super::sync_model::SyncResult;
use crate::connections::{ApiConnection, ConnectionRepository, ProviderKind};
use crate::db::DbPool;
use crate::errors::Result;
use crate::holdings::{HoldingKind, HoldingRepository};
use crate::providers::{DefaultProviderFactory, ProviderFactory};
use crate::vault::CredentialVault;

/// Orchestrates one full sync: every active connection in turn, then a
/// market-data pass over held symbols. Connections are processed sequentially
/// and independently; one broken provider never aborts its siblings.
pub struct SyncService {
    pool: Arc<DbPool>,
    vault: Arc<CredentialVault>,
    factory: Arc<dyn ProviderFactory>,
}

impl SyncService {
    pub fn new(pool: Arc<DbPool>, vault: Arc<CredentialVault>) -> Self {
        Self::with_factory(pool, vault, Arc::new(DefaultProviderFactory))
    }

    /// Constructor taking an explicit provider factory, used by tests to
    /// substitute fake providers.
    pub fn with_factory(
        pool: Arc<DbPool>,
        vault: Arc<CredentialVault>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Self {
        Self {
            pool,
            vault,
            factory,
        }
    }

    /// Synchronizes all of a user's connections and holdings. Always returns
    /// a result object; `success` only flips to false when the connections
    /// themselves could not be enumerated.
    pub async fn sync_all(&self, user_id: i32) -> SyncResult {
        let mut result = SyncResult::started();
        info!("Starting sync for user {}", user_id);

        let repo = ConnectionRepository::new(self.pool.clone());
        let connections = match repo.list_for_user(user_id) {
            Ok(connections) => connections,
            Err(e) => {
                error!("Failed to enumerate connections: {}", e);
                result.success = false;
                result.errors.push(format!("General sync error: {}", e));
                result.completed_at = chrono::Utc::now().naive_utc();
                return result;
            }
        };

        for connection in &connections {
            if !connection.is_active {
                continue;
            }

            match self.sync_connection(user_id, connection).await {
                Ok(updated) => result.accounts_updated += updated,
                Err(e) => {
                    let message =
                        format!("Error syncing {}: {}", connection.institution_name, e);
                    error!("{}", message);
                    result.errors.push(message);
                }
            }

            // Record the attempt whether or not it succeeded.
            if let Err(e) = repo.touch_last_sync(&connection.id) {
                warn!(
                    "Failed to record sync attempt for {}: {}",
                    connection.institution_name, e
                );
            }
        }

        if let Err(e) = self.refresh_market_data(user_id).await {
            let message = format!("Error refreshing market data: {}", e);
            error!("{}", message);
            result.errors.push(message);
        }

        result.completed_at = chrono::Utc::now().naive_utc();
        info!(
            "Sync finished: {} accounts updated, {} errors",
            result.accounts_updated,
            result.errors.len()
        );
        result
    }

    /// Processes one bank-aggregator connection: decrypt credentials, fetch
    /// accounts and their recent transactions, reconcile into the store.
    /// Market-data connections carry no account data and are skipped here.
    async fn sync_connection(&self, user_id: i32, connection: &ApiConnection) -> Result<usize> {
        if connection.provider_kind != ProviderKind::BankAggregator {
            return Ok(0);
        }

        let repo = ConnectionRepository::new(self.pool.clone());
        let sealed = repo.get_credentials(&connection.id)?;
        let credentials: serde_json::Value = self.vault.open_json(&sealed)?;

        let provider = self
            .factory
            .bank_provider(connection.provider_kind, &credentials)?;
        let accounts = provider.fetch_accounts().await?;

        let reconciler = Reconciler::new(self.pool.clone(), self.vault.clone());
        let mut updated = 0;
        for account in &accounts {
            let account_id = reconciler.upsert_account(user_id, account)?;
            let transactions = provider.fetch_transactions(&account.external_id).await?;
            reconciler.insert_transactions_if_absent(&account_id, &transactions)?;
            updated += 1;
        }

        info!(
            "Synced {} accounts from {}",
            updated, connection.institution_name
        );
        Ok(updated)
    }

    /// Refreshes cached prices for all held symbols, one provider call per
    /// asset class. Empty symbol sets skip the call entirely.
    async fn refresh_market_data(&self, user_id: i32) -> Result<usize> {
        let holdings = HoldingRepository::new(self.pool.clone());
        let stock_symbols = holdings.distinct_symbols(user_id, HoldingKind::Stock)?;
        let crypto_symbols = holdings.distinct_symbols(user_id, HoldingKind::Crypto)?;

        if stock_symbols.is_empty() && crypto_symbols.is_empty() {
            return Ok(0);
        }

        let provider = self.factory.quote_provider()?;
        let reconciler = Reconciler::new(self.pool.clone(), self.vault.clone());
        let mut refreshed = 0;

        if !stock_symbols.is_empty() {
            let quotes = provider.fetch_stock_quotes(&stock_symbols).await?;
            refreshed += reconciler.refresh_holding_prices(user_id, HoldingKind::Stock, &quotes)?;
        }

        if !crypto_symbols.is_empty() {
            let quotes = provider.fetch_crypto_quotes(&crypto_symbols).await?;
            refreshed +=
                reconciler.refresh_holding_prices(user_id, HoldingKind::Crypto, &quotes)?;
        }

        Ok(refreshed)
    }
}
