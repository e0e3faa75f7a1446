use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CategoryId, EntryId};

/// Maximum length of a player display name.
pub const MAX_NAME_LEN: usize = 30;

/// Leaderboard scores are accuracy percentages.
pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("player name must not be empty")]
    EmptyName,

    #[error("player name is too long: {len} > {MAX_NAME_LEN}")]
    NameTooLong { len: usize },

    #[error("score {score} exceeds {MAX_SCORE}")]
    ScoreOutOfRange { score: u32 },
}

/// Where the surviving record of a merged leaderboard row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    Local,
    Remote,
}

/// One score on the leaderboard.
///
/// Immutable after creation: a later, higher score for the same name produces
/// a replacement entry under the dedup rule rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    id: EntryId,
    name: String,
    score: u8,
    avatar_ref: String,
    date: String,
    timestamp: DateTime<Utc>,
    category: Option<CategoryId>,
    origin: EntryOrigin,
}

impl LeaderboardEntry {
    /// Builds an entry after validating the name and score.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` for an empty or over-long name or a score above
    /// 100.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntryId,
        name: impl Into<String>,
        score: u8,
        avatar_ref: impl Into<String>,
        date: impl Into<String>,
        timestamp: DateTime<Utc>,
        category: Option<CategoryId>,
        origin: EntryOrigin,
    ) -> Result<Self, EntryError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EntryError::EmptyName);
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(EntryError::NameTooLong {
                len: trimmed.chars().count(),
            });
        }
        if score > MAX_SCORE {
            return Err(EntryError::ScoreOutOfRange {
                score: u32::from(score),
            });
        }

        Ok(Self {
            id,
            name: trimmed.to_owned(),
            score,
            avatar_ref: avatar_ref.into(),
            date: date.into(),
            timestamp,
            category,
            origin,
        })
    }

    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn avatar_ref(&self) -> &str {
        &self.avatar_ref
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn category(&self) -> Option<&CategoryId> {
        self.category.as_ref()
    }

    #[must_use]
    pub fn origin(&self) -> EntryOrigin {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build(name: &str, score: u8) -> Result<LeaderboardEntry, EntryError> {
        LeaderboardEntry::new(
            EntryId::generate(),
            name,
            score,
            "/placeholder-user.jpg",
            "June 11, 2025",
            fixed_now(),
            None,
            EntryOrigin::Local,
        )
    }

    #[test]
    fn builds_valid_entry() {
        let entry = build("Priya Das", 95).unwrap();
        assert_eq!(entry.name(), "Priya Das");
        assert_eq!(entry.score(), 95);
        assert_eq!(entry.origin(), EntryOrigin::Local);
    }

    #[test]
    fn trims_name_whitespace() {
        let entry = build("  Arjun Sen  ", 92).unwrap();
        assert_eq!(entry.name(), "Arjun Sen");
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(build("   ", 50), Err(EntryError::EmptyName));
    }

    #[test]
    fn rejects_over_long_name() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            build(&name, 50),
            Err(EntryError::NameTooLong {
                len: MAX_NAME_LEN + 1
            })
        );
    }

    #[test]
    fn rejects_score_above_hundred() {
        assert_eq!(build("Meera Roy", 101), Err(EntryError::ScoreOutOfRange { score: 101 }));
    }
}
