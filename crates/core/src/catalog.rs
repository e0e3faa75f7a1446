use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{
    Category, CategoryError, CategoryId, Question, QuestionError, QuestionId,
};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("duplicate category id {0}")]
    DuplicateCategory(CategoryId),

    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),

    #[error("question {question} references unknown category {category}")]
    UnknownCategory {
        question: QuestionId,
        category: CategoryId,
    },
}

#[derive(Deserialize)]
struct RawCategory {
    id: String,
    title: String,
    description: String,
}

#[derive(Deserialize)]
struct RawQuestion {
    id: u32,
    text: String,
    options: Vec<String>,
    correct: usize,
    category: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Deserialize)]
struct RawCatalog {
    categories: Vec<RawCategory>,
    questions: Vec<RawQuestion>,
}

/// The versioned question/category reference data.
///
/// Loaded once at startup and read-only afterwards. Every record is validated
/// on load; the bundled data failing validation is a startup error, never a
/// panic.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    questions: Vec<Question>,
}

impl Catalog {
    /// Parses and validates the catalog bundled into the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is malformed.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Parses and validates a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for unparseable JSON, invalid records,
    /// duplicate ids, or a question pointing at a category that does not
    /// exist.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;

        let mut category_ids = HashSet::new();
        let mut categories = Vec::with_capacity(raw.categories.len());
        for c in raw.categories {
            let id = CategoryId::new(c.id)?;
            if !category_ids.insert(id.clone()) {
                return Err(CatalogError::DuplicateCategory(id));
            }
            categories.push(Category::new(id, c.title, c.description)?);
        }

        let mut question_ids = HashSet::new();
        let mut questions = Vec::with_capacity(raw.questions.len());
        for q in raw.questions {
            let id = QuestionId::new(q.id);
            if !question_ids.insert(id) {
                return Err(CatalogError::DuplicateQuestion(id));
            }
            let category = CategoryId::new(q.category)?;
            if !category_ids.contains(&category) {
                return Err(CatalogError::UnknownCategory {
                    question: id,
                    category,
                });
            }
            questions.push(Question::new(
                id,
                q.text,
                q.options,
                q.correct,
                category,
                q.explanation,
            )?);
        }

        Ok(Self {
            categories,
            questions,
        })
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Snapshot of all questions tagged with `category`, in catalog order.
    ///
    /// Category attempts are deterministic; only mixed mode samples randomly.
    #[must_use]
    pub fn questions_in(&self, category: &CategoryId) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.category() == category)
            .cloned()
            .collect()
    }
}
