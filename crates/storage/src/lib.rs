#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    HISTORY_CAP, HistoryRepository, InMemoryStore, LeaderboardRepository, ProfileRepository,
    RemoteCacheRepository, RemoteSnapshot, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
