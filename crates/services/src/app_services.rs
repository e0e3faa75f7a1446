use std::sync::Arc;

use log::info;

use quiz_core::Clock;
use quiz_core::catalog::Catalog;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::events::{EventSink, NullSink};
use crate::leaderboard::LeaderboardStore;
use crate::quiz_flow::QuizFlowService;
use crate::remote::{HttpRemoteStore, RemoteStore};

/// Fully wired service graph for one running app.
///
/// Build one at startup and hand shared references to the UI; everything
/// behind it is `Send + Sync`.
pub struct AppServices {
    pub storage: Storage,
    pub catalog: Arc<Catalog>,
    pub leaderboard: Arc<LeaderboardStore>,
    pub quiz_flow: Arc<QuizFlowService>,
}

impl AppServices {
    /// Wire everything over a sqlite database, with the remote client
    /// configured from the environment.
    ///
    /// Runs migrations and seeds the default leaderboard on an empty board.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` when the database cannot be opened or
    /// migrated, the bundled catalog fails to parse, or seeding fails.
    pub async fn new_sqlite(database_url: &str) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(database_url).await?;
        info!("sqlite storage ready at {database_url}");
        Self::assemble(
            storage,
            Clock::default_clock(),
            Arc::new(HttpRemoteStore::from_env()),
            Arc::new(NullSink),
        )
        .await
    }

    /// Wire everything over in-memory storage with explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` when the bundled catalog fails to parse or
    /// seeding fails.
    pub async fn in_memory(
        clock: Clock,
        remote: Arc<dyn RemoteStore>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, AppServicesError> {
        Self::assemble(Storage::in_memory(), clock, remote, events).await
    }

    async fn assemble(
        storage: Storage,
        clock: Clock,
        remote: Arc<dyn RemoteStore>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::bundled()?);

        let leaderboard = Arc::new(
            LeaderboardStore::new(
                clock,
                Arc::clone(&storage.leaderboard),
                Arc::clone(&storage.remote_cache),
                Arc::clone(&storage.profile),
                remote,
            )
            .with_events(Arc::clone(&events)),
        );
        leaderboard.seed_defaults().await?;

        let quiz_flow = Arc::new(
            QuizFlowService::new(
                Arc::clone(&catalog),
                Arc::clone(&leaderboard),
                Arc::clone(&storage.history),
                clock,
            )
            .with_events(events),
        );

        Ok(Self {
            storage,
            catalog,
            leaderboard,
            quiz_flow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn in_memory_services_come_up_seeded() {
        let services = AppServices::in_memory(
            Clock::fixed(fixed_now()),
            Arc::new(HttpRemoteStore::new(None)),
            Arc::new(NullSink),
        )
        .await
        .unwrap();

        assert!(!services.catalog.categories().is_empty());
        let board = services.leaderboard.merged(10).await.unwrap();
        assert!(!board.is_empty());
    }

    #[tokio::test]
    async fn sqlite_services_come_up_seeded() {
        let services =
            AppServices::new_sqlite("sqlite:file:memdb_services?mode=memory&cache=shared")
                .await
                .unwrap();
        let board = services.leaderboard.merged(10).await.unwrap();
        assert_eq!(board.len(), 10);
    }
}
