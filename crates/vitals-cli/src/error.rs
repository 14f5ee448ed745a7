use thiserror::Error;

/// Main error type for vitals-cli
#[derive(Error, Debug)]
pub enum VitalsError {
    #[error("Export file not found: {0}")]
    ExportNotFound(String),

    #[error("Invalid export document: {0}")]
    InvalidExport(String),

    #[error("Invalid timestamp: {0}. Expected YYYY-MM-DD HH:MM:SS +HHMM")]
    InvalidTimestamp(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, VitalsError>;

impl VitalsError {
    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a database error from a message
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an invalid-export error from a message
    pub fn invalid_export(msg: impl Into<String>) -> Self {
        Self::InvalidExport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VitalsError::Database("no such table: metrics".to_string());
        assert_eq!(err.to_string(), "Database error: no such table: metrics");
    }

    #[test]
    fn test_invalid_timestamp_error() {
        let err = VitalsError::InvalidTimestamp("not-a-date".to_string());
        assert!(err.to_string().contains("not-a-date"));
        assert!(err.to_string().contains("YYYY-MM-DD HH:MM:SS"));
    }

    #[test]
    fn test_export_not_found_error() {
        let err = VitalsError::ExportNotFound("/tmp/missing.json".to_string());
        assert!(err.to_string().contains("/tmp/missing.json"));
    }

    #[test]
    fn test_error_constructors() {
        let config_err = VitalsError::config("test config");
        assert!(matches!(config_err, VitalsError::Config(_)));

        let db_err = VitalsError::database("bad db");
        assert!(matches!(db_err, VitalsError::Database(_)));

        let export_err = VitalsError::invalid_export("bad export");
        assert!(matches!(export_err, VitalsError::InvalidExport(_)));
    }
}
