//! Error types for the account layer
//!
//! Every storage backend reports failures through this one taxonomy, so the
//! service and its callers can branch on the kind of failure without knowing
//! which backend produced it. Driver errors are classified in the
//! `From<sqlx::Error>` conversion.

use thiserror::Error;

/// SQLSTATE class for connection exceptions
const CONNECTION_EXCEPTION_CLASS: &str = "08";

/// Account layer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The storage engine is unreachable or the session is invalid
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed for a reason other than a constraint
    #[error("Storage error: {0}")]
    Storage(String),

    /// A primary-key or foreign-key constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A read matched zero rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single-row read matched more than one row
    #[error("Multiple matches: {0}")]
    MultipleMatches(String),

    /// The statement deadline elapsed before the storage engine answered
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                    let message = match db_err.constraint() {
                        Some(constraint) => format!("{} ({})", db_err.message(), constraint),
                        None => db_err.message().to_string(),
                    };
                    return Error::ConstraintViolation(message);
                }

                let in_connection_class = db_err
                    .code()
                    .map(|code| code.starts_with(CONNECTION_EXCEPTION_CLASS))
                    .unwrap_or(false);
                if in_connection_class {
                    Error::Connection(db_err.message().to_string())
                } else {
                    Error::Storage(db_err.message().to_string())
                }
            }
            sqlx::Error::RowNotFound => Error::NotFound("no rows returned".to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Error::Connection(err.to_string()),
            other => Error::Storage(other.to_string()),
        }
    }
}
