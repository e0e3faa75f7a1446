use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CategoryId, QuestionId};

/// Allowed range for the number of answer options on a question.
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text must not be empty")]
    EmptyText,

    #[error("question needs between {MIN_OPTIONS} and {MAX_OPTIONS} options, got {len}")]
    BadOptionCount { len: usize },

    #[error("option {index} must not be empty")]
    EmptyOption { index: usize },

    #[error("correct index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

/// One multiple-choice question. Immutable reference data: loaded once from
/// the catalog, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_index: usize,
    category: CategoryId,
    explanation: Option<String>,
}

impl Question {
    /// Builds a question after validating text, option count, and the
    /// correct-answer index.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or any option is empty, the option
    /// count is outside 2..=6, or `correct_index` is out of range.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        category: CategoryId,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
            return Err(QuestionError::BadOptionCount {
                len: options.len(),
            });
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            text,
            options,
            correct_index,
            category,
            explanation,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Returns true if `option_index` is the correct answer.
    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> CategoryId {
        CategoryId::new("durga-trivia").unwrap()
    }

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    #[test]
    fn builds_valid_question() {
        let q = Question::new(
            QuestionId::new(1),
            "How many days does Durga Puja traditionally last?",
            options(4),
            1,
            category(),
            Some("Five days, Shashthi through Dashami.".into()),
        )
        .unwrap();

        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.options().len(), 4);
    }

    #[test]
    fn rejects_too_few_options() {
        let err = Question::new(QuestionId::new(1), "Q?", options(1), 0, category(), None)
            .unwrap_err();
        assert_eq!(err, QuestionError::BadOptionCount { len: 1 });
    }

    #[test]
    fn rejects_too_many_options() {
        let err = Question::new(QuestionId::new(1), "Q?", options(7), 0, category(), None)
            .unwrap_err();
        assert_eq!(err, QuestionError::BadOptionCount { len: 7 });
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let err = Question::new(QuestionId::new(1), "Q?", options(4), 4, category(), None)
            .unwrap_err();
        assert_eq!(err, QuestionError::CorrectIndexOutOfRange { index: 4, len: 4 });
    }

    #[test]
    fn rejects_empty_option() {
        let mut opts = options(3);
        opts[2] = "   ".into();
        let err =
            Question::new(QuestionId::new(1), "Q?", opts, 0, category(), None).unwrap_err();
        assert_eq!(err, QuestionError::EmptyOption { index: 2 });
    }
}
