pub mod models;
pub mod plaid_provider;
pub mod provider_errors;
pub mod provider_factory;
pub mod provider_traits;
pub mod yahoo_provider;

pub use models::{NormalizedAccount, NormalizedTransaction, Quote};
pub use plaid_provider::{PlaidCredentials, PlaidProvider};
pub use provider_errors::ProviderError;
pub use provider_factory::DefaultProviderFactory;
pub use provider_traits::{BankDataProvider, ProviderFactory, QuoteProvider};
pub use yahoo_provider::YahooProvider;
