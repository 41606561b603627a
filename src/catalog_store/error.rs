use super::validation::ValidationError;
use thiserror::Error;

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Track with id '{0}' already exists")]
    DuplicateKey(String),

    #[error("Track '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Import source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CatalogError {
    /// Stable machine-readable name, used in error bodies and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::DuplicateKey(_) => "duplicate_key",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Validation(_) => "validation",
            CatalogError::SourceUnavailable(_) => "source_unavailable",
            CatalogError::Storage(_) => "internal",
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
