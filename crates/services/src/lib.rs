//! Application services for the quiz: leaderboard reconciliation, quiz flow
//! orchestration, the remote score client, and startup wiring.

#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod quiz_flow;
pub mod remote;

pub use app_services::AppServices;
pub use error::{AppServicesError, LeaderboardError, QuizFlowError, RemoteError};
pub use events::{EventSink, NullSink, QuizEvent};
pub use leaderboard::{
    DEFAULT_MERGE_LIMIT, LOCAL_CAPACITY, LeaderboardStore, REMOTE_REFRESH_SECS, RecordedAttempt,
    initials,
};
pub use quiz_flow::{CompletedAttempt, QuizFlowService};
pub use remote::{HttpRemoteStore, RemoteConfig, RemoteStore};
