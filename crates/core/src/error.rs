use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{CategoryError, EntryError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Entry(#[from] EntryError),
}
