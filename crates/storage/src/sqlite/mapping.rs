use quiz_core::model::{CategoryId, EntryId, EntryOrigin, LeaderboardEntry};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Decode one leaderboard row. Local rows carry `EntryOrigin::Local`; remote
/// entries only ever live inside the cached snapshot blob.
pub(crate) fn entry_from_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LeaderboardEntry, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id: EntryId = id.parse().map_err(ser)?;
    let name: String = row.try_get("name").map_err(ser)?;
    let score: i64 = row.try_get("score").map_err(ser)?;
    let score = u8::try_from(score).map_err(|_| ser(format!("invalid score: {score}")))?;
    let avatar_ref: String = row.try_get("avatar_ref").map_err(ser)?;
    let date: String = row.try_get("date").map_err(ser)?;
    let timestamp = row.try_get("timestamp").map_err(ser)?;
    let category: Option<String> = row.try_get("category").map_err(ser)?;
    let category = category
        .map(CategoryId::new)
        .transpose()
        .map_err(ser)?;

    LeaderboardEntry::new(
        id,
        name,
        score,
        avatar_ref,
        date,
        timestamp,
        category,
        EntryOrigin::Local,
    )
    .map_err(ser)
}
