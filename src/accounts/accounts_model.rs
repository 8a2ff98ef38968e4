use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::accounts_errors::AccountError;
use crate::vault::EncryptedBlob;

/// Internal account classification. Provider-specific type labels are mapped
/// onto this enum at the adapter boundary; anything unrecognized becomes
/// `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Credit,
    Loan,
    Investment,
    Brokerage,
    Other,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Credit => "credit",
            AccountKind::Loan => "loan",
            AccountKind::Investment => "investment",
            AccountKind::Brokerage => "brokerage",
            AccountKind::Other => "other",
        }
    }
}

impl FromStr for AccountKind {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(AccountKind::Checking),
            "credit" => Ok(AccountKind::Credit),
            "loan" => Ok(AccountKind::Loan),
            "investment" => Ok(AccountKind::Investment),
            "brokerage" => Ok(AccountKind::Brokerage),
            "other" => Ok(AccountKind::Other),
            unknown => Err(AccountError::InvalidData(format!(
                "Unknown account kind '{}'",
                unknown
            ))),
        }
    }
}

/// The sensitive part of an account record. Persisted only as an
/// `EncryptedBlob`; plaintext never touches the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub balance: f64,
    pub currency: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_api_update: Option<NaiveDateTime>,
}

/// Decrypted domain view of an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: i32,
    pub name: String,
    pub kind: AccountKind,
    pub payload: AccountPayload,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for a manually entered account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManualAccount {
    pub user_id: i32,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
    pub institution: String,
    pub account_number: Option<String>,
}

impl NewManualAccount {
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Currency cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-kind rollup returned by the account summary endpoint
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountKindSummary {
    pub count: usize,
    pub total_balance: f64,
}

/// Database model for accounts
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub user_id: i32,
    pub name: String,
    pub account_kind: String,
    pub encrypted_payload: EncryptedBlob,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_kind_round_trips_through_str() {
        for kind in [
            AccountKind::Checking,
            AccountKind::Credit,
            AccountKind::Loan,
            AccountKind::Investment,
            AccountKind::Brokerage,
            AccountKind::Other,
        ] {
            assert_eq!(kind.as_str().parse::<AccountKind>().unwrap(), kind);
        }
    }

    #[test]
    fn payload_serializes_without_empty_optionals() {
        let payload = AccountPayload {
            balance: 1200.50,
            currency: "USD".to_string(),
            institution: "ins_1".to_string(),
            account_number: None,
            last_api_update: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("accountNumber").is_none());
        assert!(json.get("lastApiUpdate").is_none());
    }
}
