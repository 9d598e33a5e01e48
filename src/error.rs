//! Error types for Studymate
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Studymate operations
///
/// Covers configuration loading, local input validation, provider
/// interactions, schedule parsing and schedule mutations.
#[derive(Error, Debug)]
pub enum StudymateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, malformed payloads, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing local input, caught before any provider call
    #[error("{0}")]
    Validation(String),

    /// Structured schedule response could not be parsed
    #[error("The AI returned an invalid schedule format. Please try again.")]
    ScheduleFormat,

    /// Schedule mutation addressed a day or event that does not exist
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Studymate operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = StudymateError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = StudymateError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_validation_error_is_shown_verbatim() {
        let error = StudymateError::Validation("Please enter a question.".to_string());
        assert_eq!(error.to_string(), "Please enter a question.");
    }

    #[test]
    fn test_schedule_format_error_display() {
        let error = StudymateError::ScheduleFormat;
        assert_eq!(
            error.to_string(),
            "The AI returned an invalid schedule format. Please try again."
        );
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = StudymateError::MissingCredentials("gemini".to_string());
        assert_eq!(error.to_string(), "Missing credentials for provider: gemini");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: StudymateError = io_error.into();
        assert!(matches!(error, StudymateError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: StudymateError = json_error.into();
        assert!(matches!(error, StudymateError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: StudymateError = yaml_error.into();
        assert!(matches!(error, StudymateError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StudymateError>();
    }
}
