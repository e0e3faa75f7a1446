use quiz_core::model::HistoryEntry;
use sqlx::Row;

use super::{SqliteRepository, mapping};
use crate::repository::{HISTORY_CAP, HistoryRepository, StorageError};

fn map_history_row(row: &sqlx::sqlite::SqliteRow) -> Result<HistoryEntry, StorageError> {
    let score: i64 = row.try_get("score").map_err(mapping::ser)?;
    let total_questions: i64 = row.try_get("total_questions").map_err(mapping::ser)?;
    let time_spent_secs: i64 = row.try_get("time_spent_secs").map_err(mapping::ser)?;

    Ok(HistoryEntry {
        date: row.try_get("date").map_err(mapping::ser)?,
        category: row.try_get("category").map_err(mapping::ser)?,
        score: u32::try_from(score).map_err(mapping::ser)?,
        total_questions: u32::try_from(total_questions).map_err(mapping::ser)?,
        time_spent_secs: u64::try_from(time_spent_secs).map_err(mapping::ser)?,
        timestamp: row.try_get("timestamp").map_err(mapping::ser)?,
    })
}

#[async_trait::async_trait]
impl HistoryRepository for SqliteRepository {
    async fn append_history(&self, entry: &HistoryEntry) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(mapping::conn)?;

        sqlx::query(
            r"
                INSERT INTO history (date, category, score, total_questions, time_spent_secs, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(&entry.date)
        .bind(&entry.category)
        .bind(i64::from(entry.score))
        .bind(i64::from(entry.total_questions))
        .bind(i64::try_from(entry.time_spent_secs).unwrap_or(i64::MAX))
        .bind(entry.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(mapping::conn)?;

        // Keep only the newest rows.
        sqlx::query(
            r"
                DELETE FROM history
                WHERE id NOT IN (SELECT id FROM history ORDER BY id DESC LIMIT ?1)
            ",
        )
        .bind(i64::try_from(HISTORY_CAP).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await
        .map_err(mapping::conn)?;

        tx.commit().await.map_err(mapping::conn)
    }

    async fn list_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT date, category, score, total_questions, time_spent_secs, timestamp
                FROM history
                ORDER BY id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(mapping::conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_history_row(&row)?);
        }
        Ok(out)
    }
}
