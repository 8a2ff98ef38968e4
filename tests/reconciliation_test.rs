use std::collections::HashMap;

use chrono::NaiveDate;

use finvault_core::accounts::{AccountKind, AccountPayload, AccountRepository};
use finvault_core::holdings::{HoldingKind, HoldingService, NewHolding};
use finvault_core::providers::{NormalizedAccount, NormalizedTransaction, Quote};
use finvault_core::sync::Reconciler;
use finvault_core::transactions::{TransactionDirection, TransactionRepository};

mod common;

fn checking_account(balance: f64) -> NormalizedAccount {
    NormalizedAccount {
        external_id: "ext-1".to_string(),
        name: "Checking".to_string(),
        kind: AccountKind::Checking,
        balance,
        currency: "USD".to_string(),
        institution: "ins_1".to_string(),
    }
}

fn coffee_transaction() -> NormalizedTransaction {
    NormalizedTransaction {
        amount: 42.50,
        direction: TransactionDirection::Debit,
        description: "Coffee".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        category: Vec::new(),
    }
}

fn quote(symbol: &str, price: f64) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        price,
        currency: "USD".to_string(),
        change: 1.0,
        percent_change: 0.5,
        volume: 1_000,
    }
}

#[test]
fn upserting_same_account_twice_keeps_one_record_with_latest_balance() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");
    let reconciler = Reconciler::new(ctx.pool.clone(), ctx.vault.clone());

    let first_id = reconciler
        .upsert_account(user_id, &checking_account(100.0))
        .unwrap();
    let second_id = reconciler
        .upsert_account(user_id, &checking_account(250.0))
        .unwrap();

    assert_eq!(first_id, second_id);

    let repo = AccountRepository::new(ctx.pool.clone());
    assert_eq!(repo.count_for_user(user_id).unwrap(), 1);

    let record = repo
        .find_by_user_and_name(user_id, "Checking")
        .unwrap()
        .unwrap();
    let payload: AccountPayload = ctx.vault.open_json(&record.encrypted_payload).unwrap();
    assert_eq!(payload.balance, 250.0);
}

#[test]
fn duplicate_transaction_is_inserted_once() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");
    let reconciler = Reconciler::new(ctx.pool.clone(), ctx.vault.clone());

    let account_id = reconciler
        .upsert_account(user_id, &checking_account(100.0))
        .unwrap();

    let inserted = reconciler
        .insert_transactions_if_absent(&account_id, &[coffee_transaction()])
        .unwrap();
    assert_eq!(inserted, 1);

    let inserted_again = reconciler
        .insert_transactions_if_absent(&account_id, &[coffee_transaction()])
        .unwrap();
    assert_eq!(inserted_again, 0);

    let repo = TransactionRepository::new(ctx.pool.clone());
    assert_eq!(repo.count_for_account(&account_id).unwrap(), 1);
}

#[test]
fn categories_are_sealed_only_when_present() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");
    let reconciler = Reconciler::new(ctx.pool.clone(), ctx.vault.clone());

    let account_id = reconciler
        .upsert_account(user_id, &checking_account(100.0))
        .unwrap();

    let mut categorized = coffee_transaction();
    categorized.description = "Latte".to_string();
    categorized.category = vec!["Food and Drink".to_string(), "Coffee".to_string()];

    reconciler
        .insert_transactions_if_absent(&account_id, &[coffee_transaction(), categorized])
        .unwrap();

    let repo = TransactionRepository::new(ctx.pool.clone());
    let rows = repo.list_for_account(&account_id, None).unwrap();
    assert_eq!(rows.len(), 2);

    for row in rows {
        if row.description == "Coffee" {
            assert!(row.encrypted_category.is_empty());
        } else {
            let category: Vec<String> = ctx.vault.open_json(&row.encrypted_category).unwrap();
            assert_eq!(category, vec!["Food and Drink", "Coffee"]);
        }
    }
}

#[test]
fn refreshing_prices_leaves_absent_symbols_untouched() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");
    let holdings = HoldingService::new(ctx.pool.clone());

    for symbol in ["AAPL", "MSFT"] {
        holdings
            .add_holding(NewHolding {
                user_id,
                kind: HoldingKind::Stock,
                symbol: symbol.to_string(),
                quantity: 10.0,
                purchase_price: 150.0,
            })
            .unwrap();
    }

    let reconciler = Reconciler::new(ctx.pool.clone(), ctx.vault.clone());
    let mut quotes = HashMap::new();
    quotes.insert("AAPL".to_string(), quote("AAPL", 213.45));

    let refreshed = reconciler
        .refresh_holding_prices(user_id, HoldingKind::Stock, &quotes)
        .unwrap();
    assert_eq!(refreshed, 1);

    let stored = holdings.list_holdings(user_id, HoldingKind::Stock).unwrap();
    let aapl = stored.iter().find(|h| h.symbol == "AAPL").unwrap();
    let msft = stored.iter().find(|h| h.symbol == "MSFT").unwrap();
    assert_eq!(aapl.current_price, 213.45);
    assert_eq!(msft.current_price, 0.0);
}

#[test]
fn readding_holding_replaces_position_but_keeps_cached_price() {
    let ctx = common::setup();
    let user_id = common::create_user(&ctx.pool, "alice");
    let holdings = HoldingService::new(ctx.pool.clone());

    holdings
        .add_holding(NewHolding {
            user_id,
            kind: HoldingKind::Crypto,
            symbol: "btc".to_string(),
            quantity: 0.5,
            purchase_price: 30_000.0,
        })
        .unwrap();

    let reconciler = Reconciler::new(ctx.pool.clone(), ctx.vault.clone());
    let mut quotes = HashMap::new();
    quotes.insert("BTC".to_string(), quote("BTC", 64_000.0));
    reconciler
        .refresh_holding_prices(user_id, HoldingKind::Crypto, &quotes)
        .unwrap();

    let replaced = holdings
        .add_holding(NewHolding {
            user_id,
            kind: HoldingKind::Crypto,
            symbol: "BTC".to_string(),
            quantity: 0.75,
            purchase_price: 42_000.0,
        })
        .unwrap();

    assert_eq!(replaced.quantity, 0.75);
    assert_eq!(replaced.purchase_price, 42_000.0);
    assert_eq!(replaced.current_price, 64_000.0);

    let all = holdings.list_holdings(user_id, HoldingKind::Crypto).unwrap();
    assert_eq!(all.len(), 1);
}
