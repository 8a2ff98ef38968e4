use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, warn};
use yahoo_finance_api as yahoo;

use super::models::Quote;
use super::provider_errors::ProviderError;
use super::provider_traits::QuoteProvider;
use crate::constants::DEFAULT_CURRENCY;

pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, ProviderError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(YahooProvider { connector })
    }

    /// Fetches the most recent daily bar for one ticker. Returns `None` when
    /// the symbol has no bar available, which the caller treats as "omit from
    /// the result", not as an error.
    async fn fetch_daily_quote(
        &self,
        ticker: &str,
        symbol: &str,
        name: String,
        fallback_currency: &str,
    ) -> Result<Option<Quote>, ProviderError> {
        let response = match self.connector.get_latest_quotes(ticker, "1d").await {
            Ok(response) => response,
            Err(yahoo::YahooError::NoQuotes)
            | Err(yahoo::YahooError::NoResult) => {
                debug!("No daily bar available for {}", ticker);
                return Ok(None);
            }
            Err(e) => return Err(ProviderError::RequestFailed(e.to_string())),
        };

        let bar = match response.last_quote() {
            Ok(bar) => bar,
            Err(_) => {
                debug!("No daily bar available for {}", ticker);
                return Ok(None);
            }
        };

        let (change, percent_change) = daily_change(bar.open, bar.close);

        Ok(Some(Quote {
            symbol: symbol.to_string(),
            name,
            price: bar.close,
            currency: fallback_currency.to_string(),
            change,
            percent_change,
            volume: bar.volume,
        }))
    }

    /// Long name from ticker search, falling back to the symbol itself.
    async fn lookup_display_name(&self, ticker: &str) -> Option<String> {
        match self.connector.search_ticker(ticker).await {
            Ok(result) => result.quotes.first().map(|item| {
                if item.long_name.is_empty() {
                    item.symbol.clone()
                } else {
                    item.long_name.clone()
                }
            }),
            Err(e) => {
                warn!("Ticker search failed for {}: {}", ticker, e);
                None
            }
        }
    }
}

/// Open-to-close change over a single daily bar.
fn daily_change(open: f64, close: f64) -> (f64, f64) {
    let change = close - open;
    let percent = if open != 0.0 {
        change / open * 100.0
    } else {
        0.0
    };
    (change, percent)
}

fn crypto_ticker(symbol: &str) -> String {
    format!("{}-USD", symbol)
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch_stock_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Quote>, ProviderError> {
        let mut quotes = HashMap::new();
        for symbol in symbols {
            let name = self
                .lookup_display_name(symbol)
                .await
                .unwrap_or_else(|| symbol.clone());
            if let Some(quote) = self
                .fetch_daily_quote(symbol, symbol, name, DEFAULT_CURRENCY)
                .await?
            {
                quotes.insert(symbol.clone(), quote);
            }
        }
        debug!("Fetched {} stock quotes", quotes.len());
        Ok(quotes)
    }

    async fn fetch_crypto_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Quote>, ProviderError> {
        let mut quotes = HashMap::new();
        for symbol in symbols {
            let ticker = crypto_ticker(symbol);
            if let Some(quote) = self
                .fetch_daily_quote(&ticker, symbol, symbol.clone(), DEFAULT_CURRENCY)
                .await?
            {
                quotes.insert(symbol.clone(), quote);
            }
        }
        debug!("Fetched {} crypto quotes", quotes.len());
        Ok(quotes)
    }
}
