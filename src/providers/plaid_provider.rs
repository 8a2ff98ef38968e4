use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

use super::models::{NormalizedAccount, NormalizedTransaction};
use super::provider_errors::ProviderError;
use super::provider_traits::BankDataProvider;
use crate::accounts::AccountKind;
use crate::constants::{DEFAULT_CURRENCY, PROVIDER_REQUEST_TIMEOUT_SECS, TRANSACTION_WINDOW_DAYS};
use crate::transactions::TransactionDirection;

static ACCOUNTS_ENDPOINT: &str = "https://production.plaid.com/accounts/get";
static TRANSACTIONS_ENDPOINT: &str = "https://production.plaid.com/transactions/get";

/// Credential document stored (sealed) for a Plaid connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaidCredentials {
    pub client_id: String,
    pub secret: String,
    pub access_token: String,
}

pub struct PlaidProvider {
    credentials: PlaidCredentials,
    client: Client,
}

impl PlaidProvider {
    pub fn new(credentials: PlaidCredentials) -> Result<Self, ProviderError> {
        if credentials.client_id.trim().is_empty()
            || credentials.secret.trim().is_empty()
            || credentials.access_token.trim().is_empty()
        {
            return Err(ProviderError::AuthenticationFailed(
                "Plaid credentials are incomplete".into(),
            ));
        }
        Ok(Self {
            credentials,
            client: Client::new(),
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        debug!("POST {}", endpoint);
        let response = self
            .client
            .post(endpoint)
            .header("PLAID-CLIENT-ID", &self.credentials.client_id)
            .header("PLAID-SECRET", &self.credentials.secret)
            .timeout(StdDuration::from_secs(PROVIDER_REQUEST_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        response.json::<T>().await.map_err(ProviderError::from)
    }
}

/// Maps Plaid account type labels onto the internal account kinds. Unknown
/// labels land in `Other`.
pub fn map_account_kind(provider_type: &str) -> AccountKind {
    match provider_type {
        "depository" => AccountKind::Checking,
        "credit" => AccountKind::Credit,
        "loan" => AccountKind::Loan,
        "investment" => AccountKind::Investment,
        "brokerage" => AccountKind::Brokerage,
        _ => AccountKind::Other,
    }
}

// === Response structs ===

#[derive(Debug, Deserialize)]
struct PlaidAccountsResponse {
    accounts: Vec<PlaidAccount>,
}

#[derive(Debug, Deserialize)]
pub struct PlaidAccount {
    pub account_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub balances: PlaidBalances,
    pub institution_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaidBalances {
    pub current: Option<f64>,
    pub iso_currency_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaidTransactionsResponse {
    transactions: Vec<PlaidTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct PlaidTransaction {
    pub amount: f64,
    pub name: String,
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub category: Vec<String>,
}

// === Converters ===

impl PlaidAccount {
    fn to_normalized(&self) -> NormalizedAccount {
        NormalizedAccount {
            external_id: self.account_id.clone(),
            name: self.name.clone(),
            kind: map_account_kind(&self.account_type),
            balance: self.balances.current.unwrap_or(0.0),
            currency: self
                .balances
                .iso_currency_code
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            institution: self.institution_id.clone().unwrap_or_default(),
        }
    }
}

impl PlaidTransaction {
    fn to_normalized(&self) -> NormalizedTransaction {
        NormalizedTransaction {
            amount: self.amount.abs(),
            direction: TransactionDirection::from_signed_amount(self.amount),
            description: self.name.clone(),
            date: self.date,
            category: self.category.clone(),
        }
    }
}

#[async_trait]
impl BankDataProvider for PlaidProvider {
    async fn fetch_accounts(&self) -> Result<Vec<NormalizedAccount>, ProviderError> {
        let response: PlaidAccountsResponse = self
            .post(
                ACCOUNTS_ENDPOINT,
                serde_json::json!({ "access_token": self.credentials.access_token }),
            )
            .await?;

        debug!("Fetched {} accounts from Plaid", response.accounts.len());
        Ok(response
            .accounts
            .iter()
            .map(PlaidAccount::to_normalized)
            .collect())
    }

    async fn fetch_transactions(
        &self,
        account_external_id: &str,
    ) -> Result<Vec<NormalizedTransaction>, ProviderError> {
        let end_date = Utc::now().date_naive();
        let start_date = end_date - Duration::days(TRANSACTION_WINDOW_DAYS);

        let response: PlaidTransactionsResponse = self
            .post(
                TRANSACTIONS_ENDPOINT,
                serde_json::json!({
                    "access_token": self.credentials.access_token,
                    "start_date": start_date.format("%Y-%m-%d").to_string(),
                    "end_date": end_date.format("%Y-%m-%d").to_string(),
                    "account_ids": [account_external_id],
                }),
            )
            .await?;

        debug!(
            "Fetched {} transactions for account {}",
            response.transactions.len(),
            account_external_id
        );
        Ok(response
            .transactions
            .iter()
            .map(PlaidTransaction::to_normalized)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_account_types() {
        assert_eq!(map_account_kind("depository"), AccountKind::Checking);
        assert_eq!(map_account_kind("credit"), AccountKind::Credit);
        assert_eq!(map_account_kind("loan"), AccountKind::Loan);
        assert_eq!(map_account_kind("investment"), AccountKind::Investment);
        assert_eq!(map_account_kind("brokerage"), AccountKind::Brokerage);
    }

    #[test]
    fn unknown_account_type_maps_to_other() {
        assert_eq!(map_account_kind("foobar"), AccountKind::Other);
    }

    #[test]
    fn rejects_incomplete_credentials() {
        let credentials = PlaidCredentials {
            client_id: "id".into(),
            secret: "".into(),
            access_token: "token".into(),
        };
        assert!(matches!(
            PlaidProvider::new(credentials),
            Err(ProviderError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn normalizes_account_from_wire_format() {
        let json = serde_json::json!({
            "account_id": "acc-1",
            "name": "Everyday Checking",
            "type": "depository",
            "balances": { "current": 1523.77, "iso_currency_code": "CAD" },
            "institution_id": "ins_9"
        });
        let account: PlaidAccount = serde_json::from_value(json).unwrap();
        let normalized = account.to_normalized();

        assert_eq!(normalized.external_id, "acc-1");
        assert_eq!(normalized.kind, AccountKind::Checking);
        assert_eq!(normalized.balance, 1523.77);
        assert_eq!(normalized.currency, "CAD");
        assert_eq!(normalized.institution, "ins_9");
    }

    #[test]
    fn normalizes_transaction_sign_into_direction() {
        let json = serde_json::json!({
            "amount": -42.50,
            "name": "Coffee",
            "date": "2024-01-05",
            "category": ["Food and Drink", "Coffee"]
        });
        let transaction: PlaidTransaction = serde_json::from_value(json).unwrap();
        let normalized = transaction.to_normalized();

        assert_eq!(normalized.amount, 42.50);
        assert_eq!(normalized.direction, TransactionDirection::Debit);
        assert_eq!(normalized.category.len(), 2);
    }

    #[test]
    fn missing_balance_and_currency_fall_back() {
        let json = serde_json::json!({
            "account_id": "acc-2",
            "name": "Mystery",
            "type": "foobar",
            "balances": {}
        });
        let account: PlaidAccount = serde_json::from_value(json).unwrap();
        let normalized = account.to_normalized();

        assert_eq!(normalized.kind, AccountKind::Other);
        assert_eq!(normalized.balance, 0.0);
        assert_eq!(normalized.currency, DEFAULT_CURRENCY);
        assert_eq!(normalized.institution, "");
    }
}
