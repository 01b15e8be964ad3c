//! Error types for the stale connection sweeper

use thiserror::Error;

/// Main application error type
///
/// Connection and execution failures are kept apart so callers can tell a
/// server that was never reached from a statement the server rejected.
/// There is deliberately no blanket `From<sqlx::Error>`: the call site
/// decides which phase failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (connection string, patterns, thresholds)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to establish or open the database connection
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// The termination statement failed server-side
    #[error("Execution error: {0}")]
    Execution(#[source] sqlx::Error),

    /// The operation was cancelled by the caller before completion
    #[error("Operation cancelled")]
    Cancelled,
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = Error::Config("bad pattern".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad pattern");
    }

    #[test]
    fn test_cancelled_error() {
        let err = Error::Cancelled;
        assert_eq!(err.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_connection_error_wraps_sqlx() {
        let err = Error::Connection(sqlx::Error::PoolClosed);
        assert!(matches!(err, Error::Connection(_)));
        assert!(err.to_string().starts_with("Connection error"));
    }

    #[test]
    fn test_execution_error_wraps_sqlx() {
        let err = Error::Execution(sqlx::Error::WorkerCrashed);
        assert!(matches!(err, Error::Execution(_)));
        assert!(err.to_string().starts_with("Execution error"));
    }
}
