use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::RunQueryDsl;

use finvault_core::accounts::{AccountKind, AccountRepository};
use finvault_core::connections::{ConnectionService, NewConnection, ProviderKind};
use finvault_core::holdings::{HoldingKind, HoldingService, NewHolding};
use finvault_core::providers::{
    BankDataProvider, NormalizedAccount, NormalizedTransaction, ProviderError, ProviderFactory,
    Quote, QuoteProvider,
};
use finvault_core::sync::SyncService;
use finvault_core::transactions::TransactionDirection;

mod common;

struct StaticBankProvider {
    accounts: Vec<NormalizedAccount>,
    transactions: Vec<NormalizedTransaction>,
}

#[async_trait]
impl BankDataProvider for StaticBankProvider {
    async fn fetch_accounts(&self) -> Result<Vec<NormalizedAccount>, ProviderError> {
        Ok(self.accounts.clone())
    }

    async fn fetch_transactions(
        &self,
        _account_external_id: &str,
    ) -> Result<Vec<NormalizedTransaction>, ProviderError> {
        Ok(self.transactions.clone())
    }
}

struct FailingBankProvider;

#[async_trait]
impl BankDataProvider for FailingBankProvider {
    async fn fetch_accounts(&self) -> Result<Vec<NormalizedAccount>, ProviderError> {
        Err(ProviderError::RequestFailed("HTTP 500: boom".to_string()))
    }

    async fn fetch_transactions(
        &self,
        _account_external_id: &str,
    ) -> Result<Vec<NormalizedTransaction>, ProviderError> {
        Err(ProviderError::RequestFailed("HTTP 500: boom".to_string()))
    }
}

struct StaticQuoteProvider {
    stock_quotes: HashMap<String, Quote>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    async fn fetch_stock_quotes(
        &self,
        _symbols: &[String],
    ) -> Result<HashMap<String, Quote>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stock_quotes.clone())
    }

    async fn fetch_crypto_quotes(
        &self,
        _symbols: &[String],
    ) -> Result<HashMap<String, Quote>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HashMap::new())
    }
}

/// Test factory: connections whose credentials carry `"mode": "fail"` get a
/// provider that errors on every call; everything else gets a provider that
/// serves one checking account with one transaction.
struct TestFactory {
    stock_quotes: HashMap<String, Quote>,
    quote_calls: Arc<AtomicUsize>,
}

impl TestFactory {
    fn new() -> Self {
        TestFactory {
            stock_quotes: HashMap::new(),
            quote_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_stock_quote(mut self, symbol: &str, price: f64) -> Self {
        self.stock_quotes.insert(
            symbol.to_string(),
            Quote {
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                price,
                currency: "USD".to_string(),
                change: 0.0,
                percent_change: 0.0,
                volume: 0,
            },
        );
        self
    }
}

impl ProviderFactory for TestFactory {
    fn bank_provider(
        &self,
        kind: ProviderKind,
        credentials: &serde_json::Value,
    ) -> Result<Arc<dyn BankDataProvider>, ProviderError> {
        if kind != ProviderKind::BankAggregator {
            return Err(ProviderError::UnsupportedKind(kind.as_str().to_string()));
        }

        if credentials.get("mode").and_then(|m| m.as_str()) == Some("fail") {
            return Ok(Arc::new(FailingBankProvider));
        }

        Ok(Arc::new(StaticBankProvider {
            accounts: vec![NormalizedAccount {
                external_id: "ext-1".to_string(),
                name: "Checking".to_string(),
                kind: AccountKind::Checking,
                balance: 512.25,
                currency: "USD".to_string(),
                institution: "ins_1".to_string(),
            }],
            transactions: vec![NormalizedTransaction {
                amount: 12.00,
                direction: TransactionDirection::Debit,
                description: "Groceries".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
                category: Vec::new(),
            }],
        }))
    }

    fn quote_provider(&self) -> Result<Arc<dyn QuoteProvider>, ProviderError> {
        Ok(Arc::new(StaticQuoteProvider {
            stock_quotes: self.stock_quotes.clone(),
            calls: self.quote_calls.clone(),
        }))
    }
}

fn add_connection(
    ctx: &common::TestContext,
    user_id: i32,
    institution: &str,
    kind: ProviderKind,
    credentials: serde_json::Value,
) -> String {
    let service = ConnectionService::new(ctx.pool.clone(), ctx.vault.clone());
    service
        .add_connection(NewConnection {
            user_id,
            institution_name: institution.to_string(),
            provider_kind: kind,
            credentials,
        })
        .unwrap()
        .id
}

#[tokio::test]
async fn failing_connection_does_not_abort_its_siblings() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");

    add_connection(
        &ctx,
        user_id,
        "Broken Bank",
        ProviderKind::BankAggregator,
        serde_json::json!({"mode": "fail"}),
    );
    add_connection(
        &ctx,
        user_id,
        "Good Bank",
        ProviderKind::BankAggregator,
        serde_json::json!({"mode": "ok"}),
    );

    let sync = SyncService::with_factory(
        ctx.pool.clone(),
        ctx.vault.clone(),
        Arc::new(TestFactory::new()),
    );
    let result = sync.sync_all(user_id).await;

    assert!(result.success);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Broken Bank"));
    assert_eq!(result.accounts_updated, 1);

    // Both connections record the attempt, failed or not.
    let connections = ConnectionService::new(ctx.pool.clone(), ctx.vault.clone())
        .list_connections(user_id)
        .unwrap();
    assert_eq!(connections.len(), 2);
    assert!(connections.iter().all(|c| c.last_sync.is_some()));

    let accounts = AccountRepository::new(ctx.pool.clone());
    assert_eq!(accounts.count_for_user(user_id).unwrap(), 1);
}

#[tokio::test]
async fn inactive_connections_are_skipped_entirely() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");

    let connection_id = add_connection(
        &ctx,
        user_id,
        "Dormant Bank",
        ProviderKind::BankAggregator,
        serde_json::json!({"mode": "fail"}),
    );

    let service = ConnectionService::new(ctx.pool.clone(), ctx.vault.clone());
    service.set_active(user_id, &connection_id, false).unwrap();

    let sync = SyncService::with_factory(
        ctx.pool.clone(),
        ctx.vault.clone(),
        Arc::new(TestFactory::new()),
    );
    let result = sync.sync_all(user_id).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.accounts_updated, 0);

    let connection = service.get_connection(user_id, &connection_id).unwrap();
    assert!(connection.last_sync.is_none());
}

#[tokio::test]
async fn market_data_connections_carry_no_accounts() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");

    let connection_id = add_connection(
        &ctx,
        user_id,
        "Yahoo Finance",
        ProviderKind::MarketData,
        serde_json::json!({}),
    );

    let sync = SyncService::with_factory(
        ctx.pool.clone(),
        ctx.vault.clone(),
        Arc::new(TestFactory::new()),
    );
    let result = sync.sync_all(user_id).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.accounts_updated, 0);

    // The attempt is still recorded.
    let connection = ConnectionService::new(ctx.pool.clone(), ctx.vault.clone())
        .get_connection(user_id, &connection_id)
        .unwrap();
    assert!(connection.last_sync.is_some());
}

#[tokio::test]
async fn enumeration_failure_flips_overall_success() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");

    let mut conn = finvault_core::db::get_connection(&ctx.pool).unwrap();
    diesel::sql_query("DROP TABLE api_connections")
        .execute(&mut conn)
        .unwrap();
    drop(conn);

    let sync = SyncService::with_factory(
        ctx.pool.clone(),
        ctx.vault.clone(),
        Arc::new(TestFactory::new()),
    );
    let result = sync.sync_all(user_id).await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn quote_pass_is_skipped_when_nothing_is_held() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");

    let factory = Arc::new(TestFactory::new());
    let quote_calls = factory.quote_calls.clone();

    let sync = SyncService::with_factory(ctx.pool.clone(), ctx.vault.clone(), factory);
    let result = sync.sync_all(user_id).await;

    assert!(result.success);
    assert_eq!(quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn quote_pass_updates_only_symbols_present_in_the_map() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");
    let holdings = HoldingService::new(ctx.pool.clone());

    for symbol in ["AAPL", "MSFT"] {
        holdings
            .add_holding(NewHolding {
                user_id,
                kind: HoldingKind::Stock,
                symbol: symbol.to_string(),
                quantity: 5.0,
                purchase_price: 100.0,
            })
            .unwrap();
    }

    let factory = Arc::new(TestFactory::new().with_stock_quote("AAPL", 213.45));
    let quote_calls = factory.quote_calls.clone();

    let sync = SyncService::with_factory(ctx.pool.clone(), ctx.vault.clone(), factory);
    let result = sync.sync_all(user_id).await;

    assert!(result.success);
    // Stocks are held, crypto is not: exactly one provider call.
    assert_eq!(quote_calls.load(Ordering::SeqCst), 1);

    let stored = holdings.list_holdings(user_id, HoldingKind::Stock).unwrap();
    let aapl = stored.iter().find(|h| h.symbol == "AAPL").unwrap();
    let msft = stored.iter().find(|h| h.symbol == "MSFT").unwrap();
    assert_eq!(aapl.current_price, 213.45);
    assert_eq!(msft.current_price, 0.0);
}
