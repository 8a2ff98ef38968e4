use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::connections_errors::ConnectionError;
use crate::vault::EncryptedBlob;

/// Closed set of provider families a connection can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderKind {
    /// Account/transaction aggregators (Plaid-style APIs).
    BankAggregator,
    /// Price-only market data sources.
    MarketData,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::BankAggregator => "BANK_AGGREGATOR",
            ProviderKind::MarketData => "MARKET_DATA",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BANK_AGGREGATOR" => Ok(ProviderKind::BankAggregator),
            "MARKET_DATA" => Ok(ProviderKind::MarketData),
            other => Err(ConnectionError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Domain model for a stored provider connection. Credentials are not part of
/// this view; they stay sealed in the database and are only read back by the
/// sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConnection {
    pub id: String,
    pub user_id: i32,
    pub institution_name: String,
    pub provider_kind: ProviderKind,
    pub is_active: bool,
    pub last_sync: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub user_id: i32,
    pub institution_name: String,
    pub provider_kind: ProviderKind,
    /// Provider-specific credential document, sealed before it is stored.
    pub credentials: serde_json::Value,
}

impl NewConnection {
    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.institution_name.trim().is_empty() {
            return Err(ConnectionError::InvalidData(
                "Institution name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for provider connections
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::api_connections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApiConnectionDB {
    pub id: String,
    pub user_id: i32,
    pub institution_name: String,
    pub provider_kind: String,
    pub encrypted_credentials: EncryptedBlob,
    pub is_active: bool,
    pub last_sync: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ApiConnectionDB> for ApiConnection {
    type Error = ConnectionError;

    fn try_from(db: ApiConnectionDB) -> Result<Self, Self::Error> {
        let provider_kind = db.provider_kind.parse()?;
        Ok(ApiConnection {
            id: db.id,
            user_id: db.user_id,
            institution_name: db.institution_name,
            provider_kind,
            is_active: db.is_active,
            last_sync: db.last_sync,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_round_trips_through_str() {
        for kind in [ProviderKind::BankAggregator, ProviderKind::MarketData] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_provider_kind_is_rejected() {
        assert!(matches!(
            "CARRIER_PIGEON".parse::<ProviderKind>(),
            Err(ConnectionError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn new_connection_requires_institution() {
        let new_connection = NewConnection {
            user_id: 1,
            institution_name: "  ".to_string(),
            provider_kind: ProviderKind::BankAggregator,
            credentials: serde_json::json!({}),
        };
        assert!(new_connection.validate().is_err());
    }
}
