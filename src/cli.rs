//! Command-line interface definition for Studymate
//!
//! This module defines the CLI structure using clap's derive API,
//! providing one-shot commands for each mode and an interactive session.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Studymate - AI study assistant
///
/// Solve homework, draw explanatory sketches, plan your week, or chat with
/// a tutor from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "studymate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Interface language (en, ru)
    #[arg(short, long, global = true)]
    pub locale: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Studymate
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Solve a homework question
    Solve {
        /// The question to solve
        #[arg(short, long)]
        prompt: Option<String>,

        /// Image of the problem (jpg, png, webp, gif, heic)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Also create a cheat sheet from the solution
        #[arg(long)]
        cheat_sheet: bool,

        /// Also generate practice problems
        #[arg(long)]
        practice: bool,
    },

    /// Generate an educational sketch
    Sketch {
        /// Concept to illustrate
        #[arg(short, long)]
        prompt: String,

        /// Edit instructions applied in order after generation
        #[arg(short, long)]
        edit: Vec<String>,

        /// Where to write the image
        #[arg(short, long, default_value = "sketch.jpg")]
        output: PathBuf,
    },

    /// Plan a schedule
    Schedule {
        /// Description of the days to plan
        #[arg(short, long)]
        prompt: String,

        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive session
    Chat {
        /// Starting mode: solver, sketcher, scheduler or tutor
        #[arg(short, long)]
        mode: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            locale: None,
            command: Commands::Chat { mode: None },
        }
    }
}
