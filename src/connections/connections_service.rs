use std::sync::Arc;

use log::info;

use super::connections_errors::{ConnectionError, Result};
use super::connections_model::{ApiConnection, ApiConnectionDB, NewConnection, ProviderKind};
use super::connections_repository::ConnectionRepository;
use crate::db::DbPool;
use crate::vault::CredentialVault;

/// Service for managing provider connections
pub struct ConnectionService {
    pool: Arc<DbPool>,
    vault: Arc<CredentialVault>,
}

impl ConnectionService {
    pub fn new(pool: Arc<DbPool>, vault: Arc<CredentialVault>) -> Self {
        Self { pool, vault }
    }

    /// Stores a new connection with its credentials sealed. The plaintext
    /// credential document never reaches the database.
    pub fn add_connection(&self, new_connection: NewConnection) -> Result<ApiConnection> {
        new_connection.validate()?;

        let sealed = self
            .vault
            .seal_json(&new_connection.credentials)
            .map_err(|e| ConnectionError::Vault(e.to_string()))?;

        let now = chrono::Utc::now().naive_utc();
        let connection_db = ApiConnectionDB {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_connection.user_id,
            institution_name: new_connection.institution_name,
            provider_kind: new_connection.provider_kind.as_str().to_string(),
            encrypted_credentials: sealed,
            is_active: true,
            last_sync: None,
            created_at: now,
            updated_at: now,
        };

        let repo = ConnectionRepository::new(self.pool.clone());
        repo.insert(&connection_db)?;

        info!(
            "Added {} connection for institution '{}'",
            connection_db.provider_kind, connection_db.institution_name
        );

        connection_db.try_into()
    }

    pub fn list_connections(&self, user_id: i32) -> Result<Vec<ApiConnection>> {
        let repo = ConnectionRepository::new(self.pool.clone());
        repo.list_for_user(user_id)
    }

    pub fn get_connection(&self, user_id: i32, connection_id: &str) -> Result<ApiConnection> {
        let repo = ConnectionRepository::new(self.pool.clone());
        repo.get_for_user(user_id, connection_id)
    }

    /// Re-seals credentials under the current key and resets the last-sync
    /// marker, mirroring a credential edit in the UI.
    pub fn update_connection(
        &self,
        user_id: i32,
        connection_id: &str,
        institution_name: &str,
        kind: ProviderKind,
        credentials: &serde_json::Value,
    ) -> Result<ApiConnection> {
        if institution_name.trim().is_empty() {
            return Err(ConnectionError::InvalidData(
                "Institution name cannot be empty".to_string(),
            ));
        }

        let sealed = self
            .vault
            .seal_json(credentials)
            .map_err(|e| ConnectionError::Vault(e.to_string()))?;

        let repo = ConnectionRepository::new(self.pool.clone());
        repo.update(user_id, connection_id, institution_name, kind.as_str(), &sealed)?;
        repo.get_for_user(user_id, connection_id)
    }

    pub fn set_active(&self, user_id: i32, connection_id: &str, active: bool) -> Result<()> {
        let repo = ConnectionRepository::new(self.pool.clone());
        repo.set_active(user_id, connection_id, active)
    }

    pub fn delete_connection(&self, user_id: i32, connection_id: &str) -> Result<()> {
        let repo = ConnectionRepository::new(self.pool.clone());
        repo.delete(user_id, connection_id)?;
        info!("Deleted connection {}", connection_id);
        Ok(())
    }
}
