//! Persisted Key-Value Storage Abstraction
//!
//! A namespaced, string-keyed store that survives process restarts. Typed
//! accessors for integers, booleans and string sets are layered on top of
//! the raw string mapping.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;

/// Key-value settings storage trait
///
/// Abstracts platform-specific preference storage:
/// - Android: SharedPreferences
/// - iOS: UserDefaults
/// - Desktop: SQLite-backed table
///
/// Every store instance is bound to a single namespace. Keys are unique
/// within it and writes are last-write-wins.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_level(store: &dyn SettingsStore, level: i64) -> Result<()> {
///     store.set_i64("saved_level", level).await
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Namespace this store is bound to
    fn namespace(&self) -> &str;

    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store an integer value
    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Retrieve an integer value
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Store a set of strings
    async fn set_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<()>;

    /// Retrieve a set of strings
    async fn get_string_set(&self, key: &str) -> Result<Option<BTreeSet<String>>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear every setting in the namespace
    async fn clear_all(&self) -> Result<()>;

    /// Begin a transaction for atomic multi-key updates
    async fn begin_transaction(&self) -> Result<Box<dyn SettingsTransaction + Send>>;
}

/// Transaction for atomic settings updates
#[async_trait]
pub trait SettingsTransaction: Send {
    /// Set a string value within the transaction
    async fn set_string(&mut self, key: &str, value: &str) -> Result<()>;

    /// Set an integer value within the transaction
    async fn set_i64(&mut self, key: &str, value: i64) -> Result<()>;

    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}
