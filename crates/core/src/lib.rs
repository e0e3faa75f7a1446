#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod session;
pub mod time;

pub use catalog::{Catalog, CatalogError};
pub use error::Error;
pub use session::{
    Answer, MIXED_SAMPLE_SIZE, POINTS_PER_QUESTION, QUESTION_TIME_LIMIT_SECS, QuizMode,
    QuizOutcome, QuizSession, Screen,
};
pub use time::Clock;
