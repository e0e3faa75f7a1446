use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use rand::Rng;
use tokio::sync::Mutex;

use quiz_core::Clock;
use quiz_core::model::{CategoryId, EntryId, EntryOrigin, LeaderboardEntry};
use storage::repository::{
    LeaderboardRepository, ProfileRepository, RemoteCacheRepository, RemoteSnapshot,
};

use crate::error::LeaderboardError;
use crate::events::{EventSink, NullSink, QuizEvent};
use crate::remote::RemoteStore;

/// The local board keeps only the top entries to bound storage use.
pub const LOCAL_CAPACITY: usize = 100;

/// Seconds a cached remote snapshot stays fresh before `merged` refetches.
pub const REMOTE_REFRESH_SECS: i64 = 30;

/// Rows shown on the board when the caller does not say otherwise.
pub const DEFAULT_MERGE_LIMIT: usize = 10;

const AVATAR_PLACEHOLDER: &str = "/placeholder-user.jpg";

/// Render a timestamp as "June 11, 2025".
#[must_use]
pub(crate) fn format_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// Uppercase first letter of each whitespace-separated name token.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Outcome of [`LeaderboardStore::record_attempt`].
///
/// The local upsert either succeeded or the whole call errored; the remote
/// push is best-effort and only ever surfaces here as a warning.
#[derive(Debug, Clone)]
pub struct RecordedAttempt {
    pub entry: LeaderboardEntry,
    pub remote_warning: Option<String>,
}

/// Owns reconciliation of score entries across the device-local store and
/// the shared remote store.
///
/// Construct one per process and pass it by reference; all the state the
/// page-global module cache used to hold (last-fetch time, cloud snapshot)
/// lives here explicitly, persisted through the repositories.
pub struct LeaderboardStore {
    clock: Clock,
    local: Arc<dyn LeaderboardRepository>,
    cache: Arc<dyn RemoteCacheRepository>,
    profile: Arc<dyn ProfileRepository>,
    remote: Arc<dyn RemoteStore>,
    events: Arc<dyn EventSink>,
    // Single-flight guard: at most one remote fetch in flight; a second
    // caller waits here and then reuses the freshly written cache.
    fetch_lock: Mutex<()>,
}

impl LeaderboardStore {
    #[must_use]
    pub fn new(
        clock: Clock,
        local: Arc<dyn LeaderboardRepository>,
        cache: Arc<dyn RemoteCacheRepository>,
        profile: Arc<dyn ProfileRepository>,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        Self {
            clock,
            local,
            cache,
            profile,
            remote,
            events: Arc::new(NullSink),
            fetch_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Record a completed attempt on the local board and push it to the
    /// remote store.
    ///
    /// The upsert keeps the higher score per name, re-sorts, and truncates to
    /// the top [`LOCAL_CAPACITY`]. The push always happens regardless of
    /// rank; a push failure never rolls back the local upsert and comes back
    /// as a soft warning plus a `RemoteSyncFailed` event.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` for an invalid name or a local storage
    /// failure.
    pub async fn record_attempt(
        &self,
        name: &str,
        accuracy_percent: u8,
        category: Option<CategoryId>,
    ) -> Result<RecordedAttempt, LeaderboardError> {
        let now = self.clock.now();
        let entry = LeaderboardEntry::new(
            EntryId::generate(),
            name,
            accuracy_percent.min(100),
            AVATAR_PLACEHOLDER,
            format_date(now),
            now,
            category,
            EntryOrigin::Local,
        )?;

        let mut board = self.local.load_entries().await?;
        match board.iter().position(|e| e.name() == entry.name()) {
            // An equal or higher record for this name already stands.
            Some(i) if board[i].score() >= entry.score() => {}
            Some(i) => board[i] = entry.clone(),
            None => board.push(entry.clone()),
        }
        sort_board(&mut board);
        board.truncate(LOCAL_CAPACITY);
        self.local.save_entries(&board).await?;

        self.events.publish(QuizEvent::LeaderboardEntryAdded {
            entry: entry.clone(),
        });

        let device_id = self.device_id().await?;
        let remote_warning = match self.remote.push(&entry, &device_id).await {
            Ok(()) => None,
            Err(err) => {
                warn!("score push to remote leaderboard failed: {err}");
                self.events.publish(QuizEvent::RemoteSyncFailed {
                    reason: err.to_string(),
                });
                Some(err.to_string())
            }
        };

        Ok(RecordedAttempt {
            entry,
            remote_warning,
        })
    }

    /// Force a remote fetch, bypassing the freshness check.
    ///
    /// A network failure degrades to the last cached snapshot, or no entries
    /// when nothing was ever fetched.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` only for local storage failures.
    pub async fn fetch_remote(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let _guard = self.fetch_lock.lock().await;
        Ok(self.refresh_locked(true).await?)
    }

    /// The merged, deduplicated board: local entries plus the remote
    /// snapshot, higher score per name winning and local winning exact ties,
    /// sorted by score (newer first on equal scores), truncated to `limit`.
    ///
    /// Refetches the remote store only when the cached snapshot is older
    /// than [`REMOTE_REFRESH_SECS`]; remote failures degrade silently to
    /// cached or local-only data.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` only for local storage failures.
    pub async fn merged(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let remote = {
            let _guard = self.fetch_lock.lock().await;
            self.refresh_locked(false).await?
        };
        let local = self.local.load_entries().await?;

        let mut by_name: HashMap<String, LeaderboardEntry> = HashMap::new();
        for entry in remote {
            match by_name.get(entry.name()) {
                Some(existing) if existing.score() >= entry.score() => {}
                _ => {
                    by_name.insert(entry.name().to_owned(), entry);
                }
            }
        }
        for entry in local {
            match by_name.get(entry.name()) {
                // Only a strictly higher remote score shadows the local
                // record; ties keep the device's own entry visible.
                Some(existing) if existing.score() > entry.score() => {}
                _ => {
                    by_name.insert(entry.name().to_owned(), entry);
                }
            }
        }

        let mut merged: Vec<LeaderboardEntry> = by_name.into_values().collect();
        sort_board(&mut merged);
        merged.truncate(limit);
        Ok(merged)
    }

    /// One-based rank of an entry on the local board, if present.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` for local storage failures.
    pub async fn rank_of(&self, id: EntryId) -> Result<Option<usize>, LeaderboardError> {
        let mut board = self.local.load_entries().await?;
        sort_board(&mut board);
        Ok(board.iter().position(|e| e.id() == id).map(|i| i + 1))
    }

    /// Whether an attempt with this accuracy would enter the top `limit`.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` for local storage failures.
    pub async fn would_rank(
        &self,
        accuracy_percent: u8,
        limit: usize,
    ) -> Result<bool, LeaderboardError> {
        let mut board = self.local.load_entries().await?;
        if board.len() < limit {
            return Ok(true);
        }
        sort_board(&mut board);
        let cutoff = board[..limit].last().map_or(0, LeaderboardEntry::score);
        Ok(accuracy_percent > cutoff)
    }

    /// The player's display name, generating and persisting a `Guest####`
    /// fallback the first time.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` for local storage failures.
    pub async fn player_name(&self) -> Result<String, LeaderboardError> {
        if let Some(name) = self.profile.player_name().await? {
            return Ok(name);
        }
        let name = format!("Guest{}", rand::rng().random_range(0..1000));
        self.profile.set_player_name(&name).await?;
        Ok(name)
    }

    /// # Errors
    ///
    /// Returns `LeaderboardError` for an empty name or storage failures.
    pub async fn set_player_name(&self, name: &str) -> Result<(), LeaderboardError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(quiz_core::model::EntryError::EmptyName.into());
        }
        Ok(self.profile.set_player_name(trimmed).await?)
    }

    /// The stable device id, generated on first use.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` for local storage failures.
    pub async fn device_id(&self) -> Result<String, LeaderboardError> {
        if let Some(id) = self.profile.device_id().await? {
            return Ok(id);
        }
        let id = format!("{:016x}", rand::rng().random::<u64>());
        self.profile.set_device_id(&id).await?;
        Ok(id)
    }

    /// Pre-populate an empty local board with the bundled default entries,
    /// so a first launch does not show an empty leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` for local storage failures.
    pub async fn seed_defaults(&self) -> Result<(), LeaderboardError> {
        if !self.local.load_entries().await?.is_empty() {
            return Ok(());
        }
        let board = default_entries(self.clock.now())?;
        self.local.save_entries(&board).await?;
        Ok(())
    }

    // Must be called with `fetch_lock` held. Re-reads the cache under the
    // lock so a caller that waited behind a refresh sees its result instead
    // of firing a duplicate request.
    async fn refresh_locked(
        &self,
        force: bool,
    ) -> Result<Vec<LeaderboardEntry>, storage::repository::StorageError> {
        let now = self.clock.now();
        let cached = self.cache.load_snapshot().await?;

        if !force
            && let Some(snapshot) = &cached
            && now.signed_duration_since(snapshot.fetched_at)
                < Duration::seconds(REMOTE_REFRESH_SECS)
        {
            debug!("remote snapshot is fresh, reusing cache");
            return Ok(snapshot.entries.clone());
        }

        match self.remote.fetch().await {
            Ok(entries) => {
                self.cache
                    .save_snapshot(&RemoteSnapshot {
                        fetched_at: now,
                        entries: entries.clone(),
                    })
                    .await?;
                Ok(entries)
            }
            Err(err) => {
                warn!("remote leaderboard fetch failed, serving cached data: {err}");
                self.events.publish(QuizEvent::RemoteSyncFailed {
                    reason: err.to_string(),
                });
                Ok(cached.map(|s| s.entries).unwrap_or_default())
            }
        }
    }
}

/// Score descending, more recent timestamp first on ties.
fn sort_board(board: &mut [LeaderboardEntry]) {
    board.sort_by_key(|e| (Reverse(e.score()), Reverse(e.timestamp())));
}

fn default_entries(
    now: DateTime<Utc>,
) -> Result<Vec<LeaderboardEntry>, quiz_core::model::EntryError> {
    const DEFAULTS: [(&str, u8); 10] = [
        ("Priya Das", 95),
        ("Arjun Sen", 92),
        ("Meera Roy", 88),
        ("Rahul Ghosh", 85),
        ("Somsubhro Dalui", 82),
        ("Ravi Sharma", 80),
        ("Sunita Patel", 78),
        ("Dev Kumar", 75),
        ("Debesh Mukherjee", 72),
        ("Kavita Joshi", 70),
    ];

    DEFAULTS
        .iter()
        .enumerate()
        .map(|(i, (name, score))| {
            let at = now - Duration::days(i64::try_from(i).unwrap_or(0) + 1);
            LeaderboardEntry::new(
                EntryId::generate(),
                *name,
                *score,
                AVATAR_PLACEHOLDER,
                format_date(at),
                at,
                None,
                EntryOrigin::Local,
            )
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
