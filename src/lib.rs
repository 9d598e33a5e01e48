//! Studymate - AI study assistant library
//!
//! This library provides the core functionality for Studymate: homework
//! solving, educational sketches, schedule planning and a streaming tutor,
//! all backed by a generative model provider.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `assistant`: Provider-backed operations for each mode and the tutor driver
//! - `studio`: Per-mode state and the operations that update it
//! - `schedule`: Schedule data and the copy-on-write schedule store
//! - `render`: Mixed markdown, math and chart rendering for terminal output
//! - `providers`: Model provider abstraction and implementations (Gemini, fake)
//! - `prompts`: System instructions and prompt builders
//! - `i18n`: Translation lookup for English and Russian
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use studymate::providers::create_provider;
//! use studymate::{Assistant, Config, Locale};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.provider.provider_type, &config.provider)?;
//!     let assistant = Assistant::new(Arc::from(provider));
//!     let solution = assistant.solve_homework("What is 2+2?", None, Locale::En).await?;
//!     println!("{}", solution);
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod i18n;
pub mod mode;
pub mod prompts;
pub mod providers;
pub mod render;
pub mod schedule;
pub mod studio;

// Re-export commonly used types
pub use assistant::{Assistant, ChatHistory, ChatMessage, Role, TutorDriver};
pub use config::Config;
pub use error::{Result, StudymateError};
pub use i18n::{Locale, Translator};
pub use mode::Mode;
pub use schedule::{EventDraft, ScheduleData, ScheduleDay, ScheduleEvent, ScheduleStore};
pub use studio::Studio;

#[cfg(test)]
pub mod test_utils;
