use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{HistoryEntry, LeaderboardEntry};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Number of newest attempt-history rows retained on this device.
pub const HISTORY_CAP: usize = 200;

/// The last successfully fetched remote leaderboard, persisted so a failed
/// fetch can degrade to stale data instead of an empty board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}

/// The device-local leaderboard. Small and always saved whole, the same way
/// the board is rewritten after every upsert/sort/truncate pass.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Load every local entry. Undecodable rows are skipped, not fatal.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for connection-level failures.
    async fn load_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Replace the stored board with `entries`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the board cannot be written.
    async fn save_entries(&self, entries: &[LeaderboardEntry]) -> Result<(), StorageError>;
}

/// Cache slot for the most recent successful remote fetch.
#[async_trait]
pub trait RemoteCacheRepository: Send + Sync {
    /// Load the cached snapshot, or `None` when nothing has been fetched yet
    /// or the stored blob is unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for connection-level failures.
    async fn load_snapshot(&self) -> Result<Option<RemoteSnapshot>, StorageError>;

    /// Overwrite the cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save_snapshot(&self, snapshot: &RemoteSnapshot) -> Result<(), StorageError>;
}

/// Per-device player profile: display name and a stable device id.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn player_name(&self) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn set_player_name(&self, name: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn device_id(&self) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn set_device_id(&self, id: &str) -> Result<(), StorageError>;
}

/// Append-only attempt log, trimmed to the newest [`HISTORY_CAP`] rows.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append one completed attempt and trim the log to capacity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn append_history(&self, entry: &HistoryEntry) -> Result<(), StorageError>;

    /// Newest entries first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for storage failures.
    async fn list_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Default)]
struct ProfileState {
    player_name: Option<String>,
    device_id: Option<String>,
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<Vec<LeaderboardEntry>>>,
    snapshot: Arc<Mutex<Option<RemoteSnapshot>>>,
    profile: Arc<Mutex<ProfileState>>,
    history: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl LeaderboardRepository for InMemoryStore {
    async fn load_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let guard = self.entries.lock().map_err(lock_err)?;
        Ok(guard.clone())
    }

    async fn save_entries(&self, entries: &[LeaderboardEntry]) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().map_err(lock_err)?;
        *guard = entries.to_vec();
        Ok(())
    }
}

#[async_trait]
impl RemoteCacheRepository for InMemoryStore {
    async fn load_snapshot(&self) -> Result<Option<RemoteSnapshot>, StorageError> {
        let guard = self.snapshot.lock().map_err(lock_err)?;
        Ok(guard.clone())
    }

    async fn save_snapshot(&self, snapshot: &RemoteSnapshot) -> Result<(), StorageError> {
        let mut guard = self.snapshot.lock().map_err(lock_err)?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn player_name(&self) -> Result<Option<String>, StorageError> {
        let guard = self.profile.lock().map_err(lock_err)?;
        Ok(guard.player_name.clone())
    }

    async fn set_player_name(&self, name: &str) -> Result<(), StorageError> {
        let mut guard = self.profile.lock().map_err(lock_err)?;
        guard.player_name = Some(name.to_owned());
        Ok(())
    }

    async fn device_id(&self) -> Result<Option<String>, StorageError> {
        let guard = self.profile.lock().map_err(lock_err)?;
        Ok(guard.device_id.clone())
    }

    async fn set_device_id(&self, id: &str) -> Result<(), StorageError> {
        let mut guard = self.profile.lock().map_err(lock_err)?;
        guard.device_id = Some(id.to_owned());
        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for InMemoryStore {
    async fn append_history(&self, entry: &HistoryEntry) -> Result<(), StorageError> {
        let mut guard = self.history.lock().map_err(lock_err)?;
        guard.push(entry.clone());
        let len = guard.len();
        if len > HISTORY_CAP {
            guard.drain(..len - HISTORY_CAP);
        }
        Ok(())
    }

    async fn list_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, StorageError> {
        let guard = self.history.lock().map_err(lock_err)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

/// Aggregates the device-local stores behind trait objects so backends can be
/// swapped per test or platform.
#[derive(Clone)]
pub struct Storage {
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub remote_cache: Arc<dyn RemoteCacheRepository>,
    pub profile: Arc<dyn ProfileRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            leaderboard: Arc::new(store.clone()),
            remote_cache: Arc::new(store.clone()),
            profile: Arc::new(store.clone()),
            history: Arc::new(store),
        }
    }
}
