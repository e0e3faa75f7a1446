use sqlx::Row;

use super::{SqliteRepository, mapping};
use crate::repository::{ProfileRepository, StorageError};

const PLAYER_NAME_KEY: &str = "player_name";
const DEVICE_ID_KEY: &str = "device_id";

impl SqliteRepository {
    async fn profile_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM profile WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(mapping::conn)?;

        row.map(|r| r.try_get("value").map_err(mapping::ser))
            .transpose()
    }

    async fn profile_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profile (key, value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(mapping::conn)?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn player_name(&self) -> Result<Option<String>, StorageError> {
        self.profile_get(PLAYER_NAME_KEY).await
    }

    async fn set_player_name(&self, name: &str) -> Result<(), StorageError> {
        self.profile_set(PLAYER_NAME_KEY, name).await
    }

    async fn device_id(&self) -> Result<Option<String>, StorageError> {
        self.profile_get(DEVICE_ID_KEY).await
    }

    async fn set_device_id(&self, id: &str) -> Result<(), StorageError> {
        self.profile_set(DEVICE_ID_KEY, id).await
    }
}
