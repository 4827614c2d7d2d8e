use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("duplicate {0}")]
    Duplicate(String),

    #[error("{0} references a row that does not exist")]
    MissingReference(String),

    #[error("{0} is still referenced and cannot be deleted")]
    Protected(String),

    #[error("only one active site settings row is allowed")]
    ActiveSettingsConflict,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which constraint family a failed statement tripped, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

pub(crate) fn violation(err: &rusqlite::Error) -> Option<Violation> {
    let rusqlite::Error::SqliteFailure(inner, _) = err else {
        return None;
    };
    if inner.code != ErrorCode::ConstraintViolation {
        return None;
    }
    match inner.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            Some(Violation::Unique)
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
        _ => None,
    }
}

/// Map a failed insert/update onto the domain error for `what`.
pub(crate) fn on_write(err: rusqlite::Error, what: &str) -> StoreError {
    match violation(&err) {
        Some(Violation::Unique) => StoreError::Duplicate(what.to_string()),
        Some(Violation::ForeignKey) => StoreError::MissingReference(what.to_string()),
        None => StoreError::Sqlite(err),
    }
}

/// Map a failed delete onto the domain error for `what`.
pub(crate) fn on_delete(err: rusqlite::Error, what: &str) -> StoreError {
    match violation(&err) {
        Some(Violation::ForeignKey) => StoreError::Protected(what.to_string()),
        _ => StoreError::Sqlite(err),
    }
}
