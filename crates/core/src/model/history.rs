use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the device-local attempt log.
///
/// Appended when an attempt reaches the results screen; read back for the
/// player's own history view. `category` is a display label, "mixed" for
/// mixed-mode play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub category: String,
    pub score: u32,
    pub total_questions: u32,
    pub time_spent_secs: u64,
    pub timestamp: DateTime<Utc>,
}
