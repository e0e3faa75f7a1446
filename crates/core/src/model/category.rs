use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category id must not be empty")]
    EmptyId,

    #[error("category title must not be empty")]
    EmptyTitle,
}

/// Key of a quiz category ("durga-trivia", "festival-foods", ...).
///
/// Questions reference categories by this key; "mixed" play is a sampling
/// mode, not a category, and never appears as a `CategoryId`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a category key from a raw string.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyId` for an empty or whitespace-only key.
    pub fn new(id: impl Into<String>) -> Result<Self, CategoryError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CategoryError::EmptyId);
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable reference data describing one quiz category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    title: String,
    description: String,
}

impl Category {
    /// Builds a category after validating its fields.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError` if the id or title is empty.
    pub fn new(
        id: CategoryId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CategoryError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CategoryError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description: description.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}
