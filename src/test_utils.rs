//! Test utilities for Studymate
//!
//! This module provides common test helpers: error assertions and studios
//! wired to the in-memory fake provider.

use crate::assistant::Assistant;
use crate::config::Config;
use crate::error::{Result, StudymateError};
use crate::i18n::{Locale, Translator};
use crate::mode::Mode;
use crate::providers::FakeProvider;
use crate::studio::Studio;
use std::sync::Arc;

/// Assert that a result failed with a `StudymateError` containing `expected`
///
/// # Panics
///
/// Panics if the result is Ok, the error is not a `StudymateError`, or its
/// message doesn't contain the expected text
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error = e
                .downcast_ref::<StudymateError>()
                .unwrap_or_else(|| panic!("Expected a StudymateError, got: {}", e));
            let error_msg = error.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration that uses the fake provider
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.provider_type = "fake".to_string();
    config.ui.locale = Some("en".to_string());
    config
}

/// English studio over a fresh fake provider
///
/// The returned provider shares state with the one inside the studio, so
/// tests can queue replies and inspect calls.
pub fn fake_studio(mode: Mode) -> (FakeProvider, Studio) {
    let fake = FakeProvider::new();
    let studio = Studio::new(
        Assistant::new(Arc::new(fake.clone())),
        Translator::new(Locale::En),
        mode,
    );
    (fake, studio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(StudymateError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    #[should_panic(expected = "Expected a StudymateError")]
    fn test_assert_error_contains_foreign_error() {
        let result: Result<()> = Err(anyhow::anyhow!("plain error"));
        assert_error_contains(result, "plain");
    }

    #[test]
    fn test_test_config_is_valid() {
        let config = test_config();
        assert_eq!(config.provider.provider_type, "fake");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fake_studio_shares_provider() {
        let (fake, studio) = fake_studio(Mode::Solver);
        assert_eq!(studio.mode(), Mode::Solver);
        assert_eq!(studio.assistant().provider().model_name(), "fake");
        assert_eq!(fake.calls(), Default::default());
    }
}
