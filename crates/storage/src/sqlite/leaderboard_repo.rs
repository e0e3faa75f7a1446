use quiz_core::model::LeaderboardEntry;

use super::{SqliteRepository, mapping};
use crate::repository::{LeaderboardRepository, StorageError};

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn load_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, name, score, avatar_ref, date, timestamp, category
                FROM leaderboard
                ORDER BY score DESC, timestamp DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(mapping::conn)?;

        // Corrupt rows degrade to "no data" for that entry only.
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if let Ok(entry) = mapping::entry_from_row(&row) {
                out.push(entry);
            }
        }
        Ok(out)
    }

    async fn save_entries(&self, entries: &[LeaderboardEntry]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(mapping::conn)?;

        sqlx::query("DELETE FROM leaderboard")
            .execute(&mut *tx)
            .await
            .map_err(mapping::conn)?;

        for entry in entries {
            sqlx::query(
                r"
                    INSERT INTO leaderboard (id, name, score, avatar_ref, date, timestamp, category)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(entry.id().to_string())
            .bind(entry.name())
            .bind(i64::from(entry.score()))
            .bind(entry.avatar_ref())
            .bind(entry.date())
            .bind(entry.timestamp())
            .bind(entry.category().map(|c| c.as_str().to_owned()))
            .execute(&mut *tx)
            .await
            .map_err(mapping::conn)?;
        }

        tx.commit().await.map_err(mapping::conn)
    }
}
