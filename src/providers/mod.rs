//! Provider module for Studymate
//!
//! This module contains the AI provider abstraction and its implementations:
//! the Gemini REST client and an in-process fake.

pub mod base;
pub mod fake;
pub mod gemini;

pub use base::{ChatSession, ImageData, ImageRequest, Provider, TextRequest, TextStream};
pub use fake::{FakeCalls, FakeProvider};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("gemini" or "fake")
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
pub fn create_provider(provider_type: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match provider_type {
        "gemini" => Ok(Box::new(GeminiProvider::new(config.gemini.clone())?)),
        "fake" => {
            tracing::info!("Initialized fake provider");
            Ok(Box::new(FakeProvider::new()))
        }
        _ => Err(crate::error::StudymateError::Provider(format!(
            "Unknown provider type: {}",
            provider_type
        ))
        .into()),
    }
}
