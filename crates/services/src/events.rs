use quiz_core::QuizOutcome;
use quiz_core::model::LeaderboardEntry;

/// Notifications for the presentation layer.
///
/// The UI subscribes to these instead of the core reaching into rendering
/// (confetti, toasts) directly.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum QuizEvent {
    AttemptCompleted { outcome: QuizOutcome },
    LeaderboardEntryAdded { entry: LeaderboardEntry },
    RemoteSyncFailed { reason: String },
}

/// Subscriber seam for [`QuizEvent`]s.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: QuizEvent);
}

/// Discards every event; the default when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: QuizEvent) {}
}
