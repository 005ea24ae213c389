//! Error types for Agora.

use thiserror::Error;

/// Common error type for Agora.
#[derive(Error, Debug)]
pub enum AgoraError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the
    /// underlying SQLite store.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required query parameter is missing.
    ///
    /// Raised synchronously before any query is performed; the caller
    /// must supply the parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Validation error for entity fields.
    ///
    /// Surfaced before any persistence occurs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from rusqlite errors
impl From<rusqlite::Error> for AgoraError {
    fn from(e: rusqlite::Error) -> Self {
        AgoraError::Database(e.to_string())
    }
}

/// Result type alias for Agora operations.
pub type Result<T> = std::result::Result<T, AgoraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error_display() {
        let err = AgoraError::InvalidInput("category_id is required".to_string());
        assert_eq!(err.to_string(), "invalid input: category_id is required");
    }

    #[test]
    fn test_validation_error_display() {
        let err = AgoraError::Validation("title must not be empty".to_string());
        assert_eq!(err.to_string(), "validation error: title must not be empty");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = AgoraError::NotFound("thread".to_string());
        assert_eq!(err.to_string(), "thread not found");
    }

    #[test]
    fn test_config_error_display() {
        let err = AgoraError::Config("bad level".to_string());
        assert_eq!(err.to_string(), "configuration error: bad level");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AgoraError = io_err.into();
        assert!(matches!(err, AgoraError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_rusqlite_error_conversion() {
        let sql_err = rusqlite::Error::QueryReturnedNoRows;
        let err: AgoraError = sql_err.into();
        assert!(matches!(err, AgoraError::Database(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(AgoraError::NotFound("post".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
