//! Configuration management for Studymate
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, StudymateError};
use crate::i18n::{detect_system_locale, Locale};
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Studymate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// AI provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Interface configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use (`gemini` or `fake`)
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model for text, structured output, language detection and chat
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model for image generation
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Model for image editing
    #[serde(default = "default_image_edit_model")]
    pub image_edit_model: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_image_edit_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            image_edit_model: default_image_edit_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Interface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Interface locale (`en` or `ru`); detected from the environment when unset
    #[serde(default)]
    pub locale: Option<String>,

    /// Mode an interactive session starts in
    #[serde(default = "default_mode")]
    pub default_mode: String,
}

fn default_mode() -> String {
    "solver".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: None,
            default_mode: default_mode(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StudymateError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| StudymateError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("STUDYMATE_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        // The generic variable is the one the Gemini tooling documents; the
        // prefixed one wins when both are set.
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            self.provider.gemini.api_key = Some(api_key);
        }
        if let Ok(api_key) = std::env::var("STUDYMATE_GEMINI_API_KEY") {
            self.provider.gemini.api_key = Some(api_key);
        }

        if let Ok(api_base) = std::env::var("STUDYMATE_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(model) = std::env::var("STUDYMATE_TEXT_MODEL") {
            self.provider.gemini.text_model = model;
        }

        if let Ok(model) = std::env::var("STUDYMATE_IMAGE_MODEL") {
            self.provider.gemini.image_model = model;
        }

        if let Ok(model) = std::env::var("STUDYMATE_IMAGE_EDIT_MODEL") {
            self.provider.gemini.image_edit_model = model;
        }

        if let Ok(timeout) = std::env::var("STUDYMATE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.gemini.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid STUDYMATE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(locale) = std::env::var("STUDYMATE_LOCALE") {
            self.ui.locale = Some(locale);
        }

        if let Ok(mode) = std::env::var("STUDYMATE_MODE") {
            self.ui.default_mode = mode;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(locale) = &cli.locale {
            tracing::debug!("Using locale override: {}", locale);
            self.ui.locale = Some(locale.clone());
        }
    }

    /// Interface locale, falling back to the system locale when unset
    pub fn locale(&self) -> Locale {
        self.ui
            .locale
            .as_deref()
            .and_then(Locale::parse_str)
            .unwrap_or_else(detect_system_locale)
    }

    /// Mode an interactive session starts in
    pub fn default_mode(&self) -> Mode {
        Mode::parse_str(&self.ui.default_mode).unwrap_or_default()
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(StudymateError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini", "fake"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(StudymateError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        let gemini = &self.provider.gemini;
        for (name, value) in [
            ("gemini.text_model", &gemini.text_model),
            ("gemini.image_model", &gemini.image_model),
            ("gemini.image_edit_model", &gemini.image_edit_model),
            ("gemini.api_base", &gemini.api_base),
        ] {
            if value.trim().is_empty() {
                return Err(StudymateError::Config(format!("{} cannot be empty", name)).into());
            }
        }

        if gemini.timeout_seconds == 0 {
            return Err(StudymateError::Config(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        match url::Url::parse(&gemini.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(StudymateError::Config(format!(
                    "gemini.api_base must be an http(s) URL: {}",
                    gemini.api_base
                ))
                .into());
            }
        }

        if let Some(locale) = &self.ui.locale {
            if Locale::parse_str(locale).is_none() {
                return Err(StudymateError::Config(format!(
                    "Invalid locale: {}. Must be one of: en, ru",
                    locale
                ))
                .into());
            }
        }

        if let Err(e) = Mode::parse_str(&self.ui.default_mode) {
            return Err(StudymateError::Config(e).into());
        }

        Ok(())
    }
}
