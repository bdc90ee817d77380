// ==========================================
// Civic Escalation - Engine Error Types
// ==========================================
// NotFound / Conflict / Unassignable / StorageError
// The engine never retries; every variant returns immediately.
// ==========================================

use crate::engine::assignment::AssignmentError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unassignable: {0}")]
    Unassignable(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl RequestError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RequestError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

// ==========================================
// Conversions
// ==========================================
// Constraint violations that reach this layer mean another writer won a
// race the pre-checks did not see, so they are reported as Conflict.
impl From<RepositoryError> for RequestError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => RequestError::NotFound { entity, id },
            RepositoryError::UniqueConstraintViolation(msg) => RequestError::Conflict(msg),
            RepositoryError::ForeignKeyViolation(msg) => RequestError::Conflict(msg),
            other => RequestError::StorageError(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for RequestError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<AssignmentError> for RequestError {
    fn from(err: AssignmentError) -> Self {
        RequestError::Unassignable(err.to_string())
    }
}

pub type RequestResult<T> = Result<T, RequestError>;
