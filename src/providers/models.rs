use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountKind;
use crate::transactions::TransactionDirection;

/// One account as reported by a bank aggregator, already translated into the
/// internal shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAccount {
    /// Provider-side account identifier, used for follow-up transaction
    /// queries only. Reconciliation joins on (user, name).
    pub external_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
    pub institution: String,
}

/// One transaction as reported by a bank aggregator. The provider's signed
/// amount is already split into magnitude and direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub amount: f64,
    pub direction: TransactionDirection,
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Vec<String>,
}

/// Latest daily quote for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    /// Open-to-close change over the most recent daily bar.
    pub change: f64,
    pub percent_change: f64,
    pub volume: u64,
}
