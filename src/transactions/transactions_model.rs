use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::vault::{CredentialVault, EncryptedBlob};

/// Direction of a transaction. Providers report signed amounts; the sign is
/// converted to a direction at the adapter boundary and amounts are stored as
/// non-negative magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

impl TransactionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionDirection::Credit => "credit",
            TransactionDirection::Debit => "debit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit" => Some(TransactionDirection::Credit),
            "debit" => Some(TransactionDirection::Debit),
            _ => None,
        }
    }

    /// Positive amounts are credits; zero and negative amounts are debits.
    pub fn from_signed_amount(amount: f64) -> Self {
        if amount > 0.0 {
            TransactionDirection::Credit
        } else {
            TransactionDirection::Debit
        }
    }
}

/// Decrypted domain view of a transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: f64,
    pub direction: TransactionDirection,
    pub description: String,
    pub date: NaiveDate,
    pub category: Option<Vec<String>>,
}

/// Database model for transactions. The tuple
/// (account_id, amount, description, transaction_type, date) is the natural
/// key backing insert-if-absent.
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub account_id: String,
    pub amount: f64,
    pub description: String,
    pub transaction_type: String,
    pub date: NaiveDate,
    pub encrypted_category: EncryptedBlob,
    pub created_at: NaiveDateTime,
}

impl TransactionDB {
    /// Converts to the domain view, opening the category when present. A
    /// category that no longer decrypts is dropped rather than failing the
    /// record.
    pub fn into_domain(self, vault: &CredentialVault) -> Transaction {
        let category = if self.encrypted_category.is_empty() {
            None
        } else {
            match vault.open_json::<Vec<String>>(&self.encrypted_category) {
                Ok(category) => Some(category),
                Err(e) => {
                    warn!("Dropping unreadable category on transaction {}: {}", self.id, e);
                    None
                }
            }
        };

        Transaction {
            id: self.id,
            account_id: self.account_id,
            amount: self.amount,
            direction: TransactionDirection::parse(&self.transaction_type)
                .unwrap_or(TransactionDirection::Debit),
            description: self.description,
            date: self.date,
            category,
        }
    }
}
