//! Special commands parser for interactive sessions
//!
//! Special commands are entered at the session prompt and act on the studio
//! instead of being sent to the model. They let the user:
//! - Switch between solver, sketcher, scheduler and tutor modes
//! - Adjust the generated schedule
//! - Derive a cheat sheet or practice problems from a solution
//! - Edit or save the current sketch
//! - View status, help, or leave the session
//!
//! Commands are prefixed with `/` and the command word is case-insensitive.

use crate::i18n::Locale;
use crate::mode::Mode;
use crate::schedule::{EventDraft, ScheduleEvent};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch to another mode, clearing all results
    SwitchMode(Mode),

    /// Change the interface language
    SwitchLocale(Locale),

    /// Show the current mode and what it holds
    ShowStatus,

    /// Print the current result of the active mode
    Show,

    /// Display help information
    Help,

    /// Add an event to a schedule day (zero-based index)
    AddEvent { day_index: usize, draft: EventDraft },

    /// `/edit` with its raw argument; its meaning depends on the mode
    Edit(String),

    /// Delete an event from a schedule day (zero-based index)
    DeleteEvent { day_index: usize, event_id: String },

    /// Create a cheat sheet from the current solution
    CheatSheet,

    /// Generate practice problems from the current solution
    Practice,

    /// Write the current sketch to a file
    Save(PathBuf),

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be processed as a regular prompt for the active mode.
    None,
}

const ADD_USAGE: &str = "/add <day> <time> | <title> [| <description>]";
const DELETE_USAGE: &str = "/delete <day> <event-id>";
const EVENT_EDIT_USAGE: &str = "/edit <day> <event-id> <time> | <title> [| <description>]";

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for non-commands.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use studymate::commands::special_commands::{parse_special_command, SpecialCommand};
/// use studymate::mode::Mode;
///
/// let cmd = parse_special_command("/mode tutor").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchMode(Mode::Tutor));
///
/// let cmd = parse_special_command("/delete 2 event-3").unwrap();
/// assert_eq!(
///     cmd,
///     SpecialCommand::DeleteEvent { day_index: 1, event_id: "event-3".to_string() }
/// );
///
/// let cmd = parse_special_command("what is 2+2?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/solver" | "/sketcher" | "/scheduler" | "/tutor" => {
            Ok(SpecialCommand::SwitchMode(parse_mode(&word[1..])?))
        }
        "/mode" => {
            require_arg("/mode", rest, "/mode <solver|sketcher|scheduler|tutor>")?;
            Ok(SpecialCommand::SwitchMode(parse_mode(rest)?))
        }

        "/locale" | "/lang" => {
            require_arg("/locale", rest, "/locale <en|ru>")?;
            Locale::parse_str(rest)
                .map(SpecialCommand::SwitchLocale)
                .ok_or_else(|| CommandError::UnsupportedArgument {
                    command: "/locale".to_string(),
                    arg: rest.to_string(),
                })
        }

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/show" => Ok(SpecialCommand::Show),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/add" => {
            require_arg("/add", rest, ADD_USAGE)?;
            let (day, fields) = split_word(rest);
            let day_index = parse_day("/add", day)?;
            let draft = parse_event_fields("/add", fields, ADD_USAGE)?;
            Ok(SpecialCommand::AddEvent { day_index, draft })
        }

        "/edit" => {
            require_arg("/edit", rest, "/edit <instruction> or ".to_string() + EVENT_EDIT_USAGE)?;
            Ok(SpecialCommand::Edit(rest.to_string()))
        }

        "/delete" | "/del" => {
            require_arg("/delete", rest, DELETE_USAGE)?;
            let (day, event_id) = split_word(rest);
            let day_index = parse_day("/delete", day)?;
            require_arg("/delete", event_id, DELETE_USAGE)?;
            Ok(SpecialCommand::DeleteEvent {
                day_index,
                event_id: event_id.to_string(),
            })
        }

        "/cheatsheet" | "/cheat-sheet" => Ok(SpecialCommand::CheatSheet),
        "/practice" => Ok(SpecialCommand::Practice),

        "/save" => {
            require_arg("/save", rest, "/save <path>")?;
            Ok(SpecialCommand::Save(PathBuf::from(rest)))
        }

        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Parse the argument of a scheduler `/edit`
///
/// The event keeps the given id; all other fields are replaced.
///
/// # Errors
///
/// Returns CommandError if the day, id, or fields are missing or malformed
///
/// # Examples
///
/// ```
/// use studymate::commands::special_commands::parse_event_edit;
///
/// let (day, event) = parse_event_edit("1 event-2 10:00 AM | Gym | Legs").unwrap();
/// assert_eq!(day, 0);
/// assert_eq!(event.id, "event-2");
/// assert_eq!(event.title, "Gym");
/// ```
pub fn parse_event_edit(args: &str) -> Result<(usize, ScheduleEvent), CommandError> {
    let (day, rest) = split_word(args.trim());
    let day_index = parse_day("/edit", day)?;
    let (id, fields) = split_word(rest);
    require_arg("/edit", id, EVENT_EDIT_USAGE)?;
    let draft = parse_event_fields("/edit", fields, EVENT_EDIT_USAGE)?;
    Ok((
        day_index,
        ScheduleEvent {
            id: id.to_string(),
            time: draft.time,
            title: draft.title,
            description: draft.description,
        },
    ))
}

fn require_arg(command: &str, arg: &str, usage: impl Into<String>) -> Result<(), CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.into(),
        });
    }
    Ok(())
}

fn parse_mode(arg: &str) -> Result<Mode, CommandError> {
    Mode::parse_str(arg).map_err(|_| CommandError::UnsupportedArgument {
        command: "/mode".to_string(),
        arg: arg.to_string(),
    })
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Days are numbered from 1 at the prompt
fn parse_day(command: &str, arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(day) if day > 0 => Ok(day - 1),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// `time | title [| description]`; blank time or title is left to draft validation
fn parse_event_fields(command: &str, fields: &str, usage: &str) -> Result<EventDraft, CommandError> {
    require_arg(command, fields, usage)?;
    let mut parts = fields.splitn(3, '|').map(str::trim);
    let time = parts.next().unwrap_or_default();
    let Some(title) = parts.next() else {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    };
    let description = parts.next().unwrap_or_default();
    Ok(EventDraft::new(time, title, description))
}

/// Help text listing every special command
pub fn help_text() -> String {
    format!(
        r#"
Special Commands for Interactive Sessions
=========================================

MODES:
  /mode <name>    - Switch mode (solver, sketcher, scheduler, tutor)
  /solver, /sketcher, /scheduler, /tutor - Shorthands for /mode
                    Switching mode clears every result

SOLVER:
  <question>      - Solve a question
  /cheatsheet     - Create a cheat sheet from the solution
  /practice       - Generate practice problems from the solution

SKETCHER:
  <concept>       - Draw a sketch
  /edit <text>    - Edit the current sketch
  /save <path>    - Write the current sketch to a file

SCHEDULER:
  <description>   - Plan a schedule
  /show           - Show the schedule with event ids
  {}
  {}
  {}

TUTOR:
  <message>       - Talk to the tutor

SESSION:
  /status         - Show the current mode and results
  /locale <en|ru> - Change the interface language
  /help           - Show this help
  exit, quit      - Leave the session
"#,
        ADD_USAGE, EVENT_EDIT_USAGE, DELETE_USAGE
    )
}

/// Print help information for special commands
pub fn print_help() {
    println!("{}", help_text());
}
