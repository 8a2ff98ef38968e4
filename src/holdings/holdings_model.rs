use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::holdings_errors::HoldingError;

/// Asset class of a holding. Each class lives in its own table; quotes are
/// fetched once per class during the market-data pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingKind {
    Stock,
    Crypto,
}

impl HoldingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingKind::Stock => "stock",
            HoldingKind::Crypto => "crypto",
        }
    }
}

/// Row shape shared by the stock and crypto holdings tables.
#[derive(Queryable, Debug, Clone)]
pub struct HoldingRow {
    pub id: String,
    pub user_id: i32,
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub current_price: f64,
    pub last_updated: NaiveDateTime,
}

/// Domain model for a holding
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub user_id: i32,
    pub kind: HoldingKind,
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
    /// Price cache, overwritten by the market-data pass. Stale until then.
    pub current_price: f64,
    pub last_updated: NaiveDateTime,
}

impl Holding {
    pub fn from_row(row: HoldingRow, kind: HoldingKind) -> Self {
        Holding {
            id: row.id,
            user_id: row.user_id,
            kind,
            symbol: row.symbol,
            quantity: row.quantity,
            purchase_price: row.purchase_price,
            current_price: row.current_price,
            last_updated: row.last_updated,
        }
    }
}

/// Input model for adding or replacing a holding
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolding {
    pub user_id: i32,
    pub kind: HoldingKind,
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
}

impl NewHolding {
    pub fn validate(&self) -> Result<(), HoldingError> {
        if self.symbol.trim().is_empty() {
            return Err(HoldingError::InvalidData(
                "Symbol cannot be empty".to_string(),
            ));
        }
        if self.quantity <= 0.0 {
            return Err(HoldingError::InvalidData(
                "Quantity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
