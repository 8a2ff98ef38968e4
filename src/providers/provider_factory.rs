use std::sync::Arc;

use super::plaid_provider::{PlaidCredentials, PlaidProvider};
use super::provider_errors::ProviderError;
use super::provider_traits::{BankDataProvider, ProviderFactory, QuoteProvider};
use super::yahoo_provider::YahooProvider;
use crate::connections::ProviderKind;

/// Production factory: Plaid for bank aggregation, Yahoo for market data.
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn bank_provider(
        &self,
        kind: ProviderKind,
        credentials: &serde_json::Value,
    ) -> Result<Arc<dyn BankDataProvider>, ProviderError> {
        match kind {
            ProviderKind::BankAggregator => {
                let credentials: PlaidCredentials = serde_json::from_value(credentials.clone())
                    .map_err(|e| ProviderError::MissingCredentials(e.to_string()))?;
                Ok(Arc::new(PlaidProvider::new(credentials)?))
            }
            ProviderKind::MarketData => Err(ProviderError::UnsupportedKind(
                "market-data connections carry no account data".to_string(),
            )),
        }
    }

    fn quote_provider(&self) -> Result<Arc<dyn QuoteProvider>, ProviderError> {
        Ok(Arc::new(YahooProvider::new()?))
    }
}
