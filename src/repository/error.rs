// ==========================================
// Civic Escalation - Repository Error Types
// ==========================================
// Tooling: thiserror derive
// ==========================================

use thiserror::Error;

/// Repository layer error
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Lookup =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== Database =====
    #[error("database lock acquisition failed: {0}")]
    LockError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    // ===== Data quality =====
    #[error("invalid field value (field={field}): {message}")]
    FieldValueError { field: String, message: String },
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// BEGIN or COMMIT failed; not a statement error
    pub fn transaction(err: rusqlite::Error) -> Self {
        RepositoryError::DatabaseTransactionError(err.to_string())
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32, msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), Some(msg.to_string()))
    }

    #[test]
    fn test_constraint_messages_are_classified() {
        let err: RepositoryError = sqlite_failure(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: user_request.request_object_id",
        )
        .into();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        let err: RepositoryError =
            sqlite_failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY, "FOREIGN KEY constraint failed").into();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));

        let err: RepositoryError = sqlite_failure(ffi::SQLITE_ERROR, "no such table: post").into();
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));
    }

    #[test]
    fn test_transaction_failures_keep_their_own_kind() {
        let err = RepositoryError::transaction(sqlite_failure(
            ffi::SQLITE_ERROR,
            "cannot start a transaction within a transaction",
        ));
        assert!(matches!(err, RepositoryError::DatabaseTransactionError(_)));
        assert!(err.to_string().starts_with("database transaction failed"));
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
