//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{SettingsStore, SettingsTransaction},
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, error};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        namespace TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        value_type TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (namespace, key)
    )
"#;

const UPSERT: &str = r#"
    INSERT INTO settings (namespace, key, value, value_type, updated_at)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(namespace, key) DO UPDATE SET
        value = excluded.value,
        value_type = excluded.value_type,
        updated_at = excluded.updated_at
"#;

/// SQLite-backed settings store bound to one namespace.
///
/// Several namespaces can share a database file; each store instance only
/// ever sees its own rows.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
    namespace: String,
}

impl SqliteSettingsStore {
    /// Open (or create) the database at `db_path`
    pub async fn new(db_path: PathBuf, namespace: impl Into<String>) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        let store = Self::with_pool(pool, namespace).await?;
        debug!(path = ?db_path, namespace = %store.namespace, "Initialized settings store");
        Ok(store)
    }

    /// In-memory store (for testing). A single connection keeps every query
    /// on the same database.
    pub async fn in_memory(namespace: impl Into<String>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        Self::with_pool(pool, namespace).await
    }

    async fn with_pool(pool: SqlitePool, namespace: impl Into<String>) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(Self {
            pool,
            namespace: namespace.into(),
        })
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn set_value(&self, key: &str, value: &str, value_type: &str) -> Result<()> {
        sqlx::query(UPSERT)
            .bind(&self.namespace)
            .bind(key)
            .bind(value)
            .bind(value_type)
            .bind(Self::now())
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to set setting: {}", e)))?;

        debug!(key = key, value_type = value_type, "Stored setting");
        Ok(())
    }

    /// Get a value and verify its type
    async fn get_value(&self, key: &str, expected_type: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT value, value_type FROM settings WHERE namespace = ? AND key = ?",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to get setting: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row.get(0);
        let value_type: String = row.get(1);

        if value_type != expected_type {
            error!(
                key = key,
                expected = expected_type,
                actual = %value_type,
                "Type mismatch"
            );
            return Err(BridgeError::OperationFailed(format!(
                "Type mismatch for '{}': expected {}, got {}",
                key, expected_type, value_type
            )));
        }

        Ok(Some(value))
    }

    fn parse<T: std::str::FromStr>(key: &str, raw: String) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        raw.parse()
            .map_err(|e| BridgeError::OperationFailed(format!("Parse error for '{}': {}", key, e)))
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value, "string").await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key, "string").await
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_value(key, &value.to_string(), "bool").await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get_value(key, "bool").await? {
            Some(raw) => Ok(Some(Self::parse(key, raw)?)),
            None => Ok(None),
        }
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set_value(key, &value.to_string(), "i64").await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get_value(key, "i64").await? {
            Some(raw) => Ok(Some(Self::parse(key, raw)?)),
            None => Ok(None),
        }
    }

    async fn set_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        let encoded = serde_json::to_string(values)
            .map_err(|e| BridgeError::OperationFailed(format!("Encode error: {}", e)))?;
        self.set_value(key, &encoded, "string_set").await
    }

    async fn get_string_set(&self, key: &str) -> Result<Option<BTreeSet<String>>> {
        match self.get_value(key, "string_set").await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                BridgeError::OperationFailed(format!("Parse error for '{}': {}", key, e))
            }),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE namespace = ? AND key = ?")
            .bind(&self.namespace)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to delete setting: {}", e)))?;

        debug!(key = key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE namespace = ? AND key = ?")
            .bind(&self.namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to check key: {}", e)))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings WHERE namespace = ? ORDER BY key")
            .bind(&self.namespace)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to list keys: {}", e)))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE namespace = ?")
            .bind(&self.namespace)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to clear settings: {}", e)))?;

        debug!(namespace = %self.namespace, "Cleared all settings");
        Ok(())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn SettingsTransaction + Send>> {
        let tx = self.pool.begin().await.map_err(|e| {
            BridgeError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        Ok(Box::new(SqliteSettingsTransaction {
            tx: Some(tx),
            namespace: self.namespace.clone(),
        }))
    }
}

struct SqliteSettingsTransaction {
    tx: Option<sqlx::Transaction<'static, sqlx::Sqlite>>,
    namespace: String,
}

impl SqliteSettingsTransaction {
    async fn set_value(&mut self, key: &str, value: &str, value_type: &str) -> Result<()> {
        let tx = self.tx.as_mut().ok_or_else(|| {
            BridgeError::OperationFailed("Transaction already finished".to_string())
        })?;

        sqlx::query(UPSERT)
            .bind(&self.namespace)
            .bind(key)
            .bind(value)
            .bind(value_type)
            .bind(SqliteSettingsStore::now())
            .execute(&mut **tx)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to set setting: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl SettingsTransaction for SqliteSettingsTransaction {
    async fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value, "string").await
    }

    async fn set_i64(&mut self, key: &str, value: i64) -> Result<()> {
        self.set_value(key, &value.to_string(), "i64").await
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let tx = self.tx.take().ok_or_else(|| {
            BridgeError::OperationFailed("Transaction already finished".to_string())
        })?;

        tx.commit()
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to commit: {}", e)))?;

        debug!("Committed settings transaction");
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        let tx = self.tx.take().ok_or_else(|| {
            BridgeError::OperationFailed("Transaction already finished".to_string())
        })?;

        tx.rollback()
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to rollback: {}", e)))?;

        debug!("Rolled back settings transaction");
        Ok(())
    }
}
