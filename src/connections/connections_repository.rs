use std::sync::Arc;

use diesel::prelude::*;

use super::connections_errors::{ConnectionError, Result};
use super::connections_model::{ApiConnection, ApiConnectionDB};
use crate::db::{get_connection, DbPool};
use crate::schema::api_connections;
use crate::schema::api_connections::dsl::*;
use crate::vault::EncryptedBlob;

/// Repository for managing provider connections in the database
pub struct ConnectionRepository {
    pool: Arc<DbPool>,
}

impl ConnectionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub fn insert(&self, connection_db: &ApiConnectionDB) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        diesel::insert_into(api_connections::table)
            .values(connection_db)
            .execute(&mut conn)?;

        Ok(())
    }

    /// Lists all connections belonging to a user, oldest first.
    pub fn list_for_user(&self, user: i32) -> Result<Vec<ApiConnection>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        api_connections::table
            .filter(user_id.eq(user))
            .order(created_at.asc())
            .load::<ApiConnectionDB>(&mut conn)?
            .into_iter()
            .map(ApiConnection::try_from)
            .collect()
    }

    pub fn get_for_user(&self, user: i32, connection_id: &str) -> Result<ApiConnection> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        let record = api_connections::table
            .filter(id.eq(connection_id))
            .filter(user_id.eq(user))
            .first::<ApiConnectionDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ConnectionError::NotFound(format!(
                    "Connection with id {} not found",
                    connection_id
                )),
                _ => ConnectionError::DatabaseError(e.to_string()),
            })?;

        record.try_into()
    }

    /// Reads back the sealed credential blob for one connection.
    pub fn get_credentials(&self, connection_id: &str) -> Result<EncryptedBlob> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        api_connections::table
            .filter(id.eq(connection_id))
            .select(encrypted_credentials)
            .first::<EncryptedBlob>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ConnectionError::NotFound(format!(
                    "Connection with id {} not found",
                    connection_id
                )),
                _ => ConnectionError::DatabaseError(e.to_string()),
            })
    }

    /// Replaces institution, kind and sealed credentials, and clears the
    /// last-sync marker so the next sync starts from a clean slate.
    pub fn update(
        &self,
        user: i32,
        connection_id: &str,
        institution: &str,
        kind: &str,
        credentials: &EncryptedBlob,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(
            api_connections::table
                .filter(id.eq(connection_id))
                .filter(user_id.eq(user)),
        )
        .set((
            institution_name.eq(institution),
            provider_kind.eq(kind),
            encrypted_credentials.eq(credentials),
            last_sync.eq(None::<chrono::NaiveDateTime>),
            updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(ConnectionError::NotFound(format!(
                "Connection with id {} not found",
                connection_id
            )));
        }

        Ok(())
    }

    pub fn set_active(&self, user: i32, connection_id: &str, active: bool) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(
            api_connections::table
                .filter(id.eq(connection_id))
                .filter(user_id.eq(user)),
        )
        .set((
            is_active.eq(active),
            updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(ConnectionError::NotFound(format!(
                "Connection with id {} not found",
                connection_id
            )));
        }

        Ok(())
    }

    pub fn delete(&self, user: i32, connection_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        let affected = diesel::delete(
            api_connections::table
                .filter(id.eq(connection_id))
                .filter(user_id.eq(user)),
        )
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(ConnectionError::NotFound(format!(
                "Connection with id {} not found",
                connection_id
            )));
        }

        Ok(affected)
    }

    /// Stamps the last-sync timestamp. Called by the orchestrator after every
    /// sync attempt, successful or not.
    pub fn touch_last_sync(&self, connection_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        diesel::update(api_connections::table.filter(id.eq(connection_id)))
            .set(last_sync.eq(chrono::Utc::now().naive_utc()))
            .execute(&mut conn)?;

        Ok(())
    }
}
