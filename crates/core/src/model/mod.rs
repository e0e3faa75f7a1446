mod category;
mod entry;
mod history;
mod ids;
mod question;

pub use ids::{EntryId, ParseIdError, QuestionId};

pub use category::{Category, CategoryError, CategoryId};
pub use entry::{EntryError, EntryOrigin, LeaderboardEntry, MAX_NAME_LEN, MAX_SCORE};
pub use history::HistoryEntry;
pub use question::{MAX_OPTIONS, MIN_OPTIONS, Question, QuestionError};
