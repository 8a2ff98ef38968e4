use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::models::{NormalizedAccount, NormalizedTransaction, Quote};
use super::provider_errors::ProviderError;
use crate::connections::ProviderKind;

/// Adapter over one bank-aggregator style source. Implementations are
/// constructed with decrypted connection credentials and translate the
/// provider's wire format into the internal normalized shape.
#[async_trait]
pub trait BankDataProvider: Send + Sync {
    async fn fetch_accounts(&self) -> Result<Vec<NormalizedAccount>, ProviderError>;

    /// Transactions for one provider-side account over the fixed trailing
    /// window ending now.
    async fn fetch_transactions(
        &self,
        account_external_id: &str,
    ) -> Result<Vec<NormalizedTransaction>, ProviderError>;
}

/// Adapter over a price-only market data source. Symbols with no available
/// daily bar are omitted from the result rather than reported as errors.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_stock_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Quote>, ProviderError>;

    async fn fetch_crypto_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Quote>, ProviderError>;
}

/// Dispatches a connection's stored provider kind to a concrete adapter.
/// The sync engine only ever talks to providers through this trait, so tests
/// can substitute fakes.
pub trait ProviderFactory: Send + Sync {
    fn bank_provider(
        &self,
        kind: ProviderKind,
        credentials: &serde_json::Value,
    ) -> Result<Arc<dyn BankDataProvider>, ProviderError>;

    fn quote_provider(&self) -> Result<Arc<dyn QuoteProvider>, ProviderError>;
}
