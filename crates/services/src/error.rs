//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::catalog::CatalogError;
use quiz_core::model::EntryError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the remote leaderboard client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("remote leaderboard returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `LeaderboardStore`.
///
/// Remote fetch/push failures never appear here; they degrade to cached data
/// or a soft warning per the failure semantics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("no questions available for category {0}")]
    NoQuestions(String),
    #[error("attempt has not reached the results screen")]
    NotCompleted,
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}
