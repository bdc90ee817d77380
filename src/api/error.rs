// ==========================================
// Civic Escalation - API Error Types
// ==========================================
// Scope: the error kinds an outer HTTP/RPC layer maps to responses.
// Each kind has a stable code().
// ==========================================

use crate::engine::error::RequestError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unassignable: {0}")]
    Unassignable(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl ApiError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unassignable(_) => "UNASSIGNABLE",
            ApiError::StorageError(_) => "STORAGE_ERROR",
        }
    }
}

// ==========================================
// From RequestError (lifecycle operations)
// ==========================================
impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RequestError::Conflict(msg) => ApiError::Conflict(msg),
            RequestError::Unassignable(msg) => ApiError::Unassignable(msg),
            RequestError::StorageError(msg) => ApiError::StorageError(msg),
        }
    }
}

// ==========================================
// From RepositoryError (read paths)
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("unique constraint violated: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::Conflict(format!("foreign key constraint violated: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            other => ApiError::StorageError(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ApiError::InvalidInput(String::new()),
            ApiError::NotFound(String::new()),
            ApiError::Conflict(String::new()),
            ApiError::Unassignable(String::new()),
            ApiError::StorageError(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_request_error_conversion() {
        let err: ApiError = RequestError::not_found("Post", "p-1").into();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("Post(id=p-1)"));

        let err: ApiError = RequestError::Unassignable("no boards".into()).into();
        assert_eq!(err.code(), "UNASSIGNABLE");

        let err: ApiError = RequestError::StorageError("disk I/O".into()).into();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::not_found("Board", 3).into();
        assert_eq!(err.code(), "NOT_FOUND");

        let err: ApiError = RepositoryError::UniqueConstraintViolation("dup".into()).into();
        assert_eq!(err.code(), "CONFLICT");

        let err: ApiError = RepositoryError::LockError("poisoned".into()).into();
        assert_eq!(err.code(), "STORAGE_ERROR");

        let err: ApiError = RepositoryError::DatabaseTransactionError("busy".into()).into();
        assert_eq!(err.code(), "STORAGE_ERROR");

        let err: ApiError = RepositoryError::FieldValueError {
            field: "recent_actions_limit".into(),
            message: "must be positive".into(),
        }
        .into();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.to_string().contains("recent_actions_limit"));
    }
}
