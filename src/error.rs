use crate::model::{EntityKind, Id};

/// Failures that end a catalog request.
///
/// Validation problems and blocked deletes are not errors: they come back as
/// `Outcome::Invalid` / `Outcome::Blocked` so the caller can redisplay them.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Id },

    /// The record could not be stored as typed, e.g. an unknown copy status
    #[error("invalid {kind} record: {message}")]
    InvalidRecord { kind: EntityKind, message: String },

    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        CatalogError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
