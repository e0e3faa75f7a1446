use quiz_core::model::LeaderboardEntry;
use sqlx::Row;

use super::{SqliteRepository, mapping};
use crate::repository::{RemoteCacheRepository, RemoteSnapshot, StorageError};

#[async_trait::async_trait]
impl RemoteCacheRepository for SqliteRepository {
    async fn load_snapshot(&self) -> Result<Option<RemoteSnapshot>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT fetched_at, entries
                FROM remote_cache
                WHERE slot = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(mapping::conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let fetched_at = row.try_get("fetched_at").map_err(mapping::ser)?;
        let blob: String = row.try_get("entries").map_err(mapping::ser)?;

        // An unreadable cached blob means "never fetched", not an error.
        match serde_json::from_str::<Vec<LeaderboardEntry>>(&blob) {
            Ok(entries) => Ok(Some(RemoteSnapshot {
                fetched_at,
                entries,
            })),
            Err(_) => Ok(None),
        }
    }

    async fn save_snapshot(&self, snapshot: &RemoteSnapshot) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&snapshot.entries).map_err(mapping::ser)?;

        sqlx::query(
            r"
                INSERT INTO remote_cache (slot, fetched_at, entries)
                VALUES (1, ?1, ?2)
                ON CONFLICT(slot) DO UPDATE SET
                    fetched_at = excluded.fetched_at,
                    entries = excluded.entries
            ",
        )
        .bind(snapshot.fetched_at)
        .bind(blob)
        .execute(&self.pool)
        .await
        .map_err(mapping::conn)?;

        Ok(())
    }
}
