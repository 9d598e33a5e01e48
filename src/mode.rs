//! Studio modes
//!
//! The assistant works in one of four modes at a time:
//! - Solver: answers homework questions, optionally from an image
//! - Sketcher: draws and edits educational illustrations
//! - Scheduler: plans a week and lets the user adjust it
//! - Tutor: streaming conversation with a tutoring persona

use crate::i18n::Translator;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Active studio mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Homework solver
    #[default]
    Solver,
    /// Sketch generation and editing
    Sketcher,
    /// Weekly schedule planner
    Scheduler,
    /// Conversational tutor
    Tutor,
}

impl Mode {
    /// All modes in menu order
    pub const ALL: [Mode; 4] = [Mode::Solver, Mode::Sketcher, Mode::Scheduler, Mode::Tutor];

    /// Parse a mode from a string
    ///
    /// # Arguments
    ///
    /// * `s` - Mode name, case-insensitive
    ///
    /// # Returns
    ///
    /// Returns the parsed Mode or an error if the string is not a mode name
    ///
    /// # Examples
    ///
    /// ```
    /// use studymate::mode::Mode;
    ///
    /// assert_eq!(Mode::parse_str("Tutor").unwrap(), Mode::Tutor);
    /// assert!(Mode::parse_str("painter").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "solver" | "solve" => Ok(Self::Solver),
            "sketcher" | "sketch" => Ok(Self::Sketcher),
            "scheduler" | "schedule" => Ok(Self::Scheduler),
            "tutor" => Ok(Self::Tutor),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }

    /// Lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solver => "solver",
            Self::Sketcher => "sketcher",
            Self::Scheduler => "scheduler",
            Self::Tutor => "tutor",
        }
    }

    /// Translation key of the mode label
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Solver => "modes.solver",
            Self::Sketcher => "modes.sketcher",
            Self::Scheduler => "modes.scheduler",
            Self::Tutor => "modes.tutor",
        }
    }

    /// Translation key of the input placeholder
    pub fn placeholder_key(&self) -> &'static str {
        match self {
            Self::Solver => "homeworkInput.solverPlaceholder",
            Self::Sketcher => "homeworkInput.sketcherPlaceholder",
            Self::Scheduler => "homeworkInput.schedulerPlaceholder",
            Self::Tutor => "homeworkInput.tutorPlaceholder",
        }
    }

    /// Translation key of the in-progress label
    pub fn busy_key(&self) -> &'static str {
        match self {
            Self::Solver => "buttons.solving",
            Self::Sketcher => "buttons.sketching",
            Self::Scheduler => "buttons.planning",
            Self::Tutor => "buttons.replying",
        }
    }

    /// Colored `[Label]` tag in the translator's language
    pub fn colored_tag(&self, translator: &Translator) -> String {
        let label = translator.t(self.label_key());
        match self {
            Self::Solver => format!("[{}]", label.purple()),
            Self::Sketcher => format!("[{}]", label.yellow()),
            Self::Scheduler => format!("[{}]", label.cyan()),
            Self::Tutor => format!("[{}]", label.green()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
