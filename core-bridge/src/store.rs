//! Game progress store
//!
//! Typed keys over the host settings store. Read-modify-write operations
//! (high score, achievements, first-run flag) hold a lock for their whole
//! sequence so bridge calls and host callbacks never interleave them.

use bridge_traits::error::Result;
use bridge_traits::SettingsStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const KEY_HIGH_SCORE: &str = "high_score";
pub const KEY_SAVED_LEVEL: &str = "saved_level";
pub const KEY_FIRST_TIME: &str = "first_time";
pub const KEY_ACHIEVEMENTS: &str = "achievements";

const DEFAULT_SAVED_LEVEL: i64 = 1;

/// Key holding the best score for `level`
pub fn level_score_key(level: i64) -> String {
    format!("level_{}_score", level)
}

#[derive(Clone)]
pub struct GameStore {
    settings: Arc<dyn SettingsStore>,
    write_lock: Arc<Mutex<()>>,
}

impl GameStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn namespace(&self) -> &str {
        self.settings.namespace()
    }

    // ------------------------------------------------------------------
    // Raw entries
    // ------------------------------------------------------------------

    pub async fn save(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.settings.set_string(key, value).await?;
        debug!(key, len = value.len(), "Data saved");
        Ok(())
    }

    pub async fn load(&self, key: &str) -> Result<Option<String>> {
        self.settings.get_string(key).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.settings.delete(key).await
    }

    /// Remove every entry, including progress and the first-run flag
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.settings.clear_all().await?;
        info!(namespace = self.namespace(), "Game data cleared");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    pub async fn high_score(&self) -> Result<i64> {
        Ok(self.settings.get_i64(KEY_HIGH_SCORE).await?.unwrap_or(0))
    }

    /// Record `score`, keeping the maximum seen. Returns the stored value.
    pub async fn record_score(&self, score: i64) -> Result<i64> {
        let _guard = self.write_lock.lock().await;
        let current = self.settings.get_i64(KEY_HIGH_SCORE).await?.unwrap_or(0);
        if score > current {
            self.settings.set_i64(KEY_HIGH_SCORE, score).await?;
            info!(score, previous = current, "New high score");
            Ok(score)
        } else {
            Ok(current)
        }
    }

    pub async fn saved_level(&self) -> Result<i64> {
        Ok(self
            .settings
            .get_i64(KEY_SAVED_LEVEL)
            .await?
            .unwrap_or(DEFAULT_SAVED_LEVEL))
    }

    pub async fn level_score(&self, level: i64) -> Result<Option<i64>> {
        self.settings.get_i64(&level_score_key(level)).await
    }

    /// Persist the saved level and that level's score together
    pub async fn record_level(&self, level: i64, score: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.settings.begin_transaction().await?;
        if let Err(e) = stage_level(tx.as_mut(), level, score).await {
            tx.rollback().await?;
            return Err(e);
        }
        tx.commit().await?;
        debug!(level, score, "Level progress saved");
        Ok(())
    }

    pub async fn achievements(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .settings
            .get_string_set(KEY_ACHIEVEMENTS)
            .await?
            .unwrap_or_default())
    }

    /// Add `achievement` to the cumulative set. Returns `false` when it was
    /// already unlocked.
    pub async fn add_achievement(&self, achievement: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut set = self
            .settings
            .get_string_set(KEY_ACHIEVEMENTS)
            .await?
            .unwrap_or_default();
        if !set.insert(achievement.to_string()) {
            return Ok(false);
        }
        self.settings.set_string_set(KEY_ACHIEVEMENTS, &set).await?;
        Ok(true)
    }

    /// `true` exactly once per install (or per [`clear`](Self::clear)).
    pub async fn take_first_time(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let first = self
            .settings
            .get_bool(KEY_FIRST_TIME)
            .await?
            .unwrap_or(true);
        if first {
            self.settings.set_bool(KEY_FIRST_TIME, false).await?;
        }
        Ok(first)
    }
}

async fn stage_level(
    tx: &mut (dyn bridge_traits::SettingsTransaction + Send),
    level: i64,
    score: i64,
) -> Result<()> {
    tx.set_i64(KEY_SAVED_LEVEL, level).await?;
    tx.set_i64(&level_score_key(level), score).await
}
