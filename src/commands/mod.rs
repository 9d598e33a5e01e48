/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `solve`:    Solve one question, optionally with cheat sheet and practice
- `sketch`:   Generate a sketch, apply edits, write it to a file
- `schedule`: Plan a schedule and print it
- `chat`:     Interactive session across all modes

The handlers are thin: they build a [`Studio`] over the configured provider
and print its state.
*/

use crate::assistant::Assistant;
use crate::config::Config;
use crate::error::Result;
use crate::i18n::Translator;
use crate::mode::Mode;
use crate::providers::create_provider;
use crate::render::Flavor;
use crate::studio::Studio;
use std::sync::Arc;

// Result formatting
pub mod display;

// Special commands parser for interactive sessions
pub mod special_commands;

/// Build a studio over the configured provider
///
/// # Errors
///
/// Returns error if the provider cannot be created
pub fn build_studio(config: &Config, mode: Mode) -> Result<Studio> {
    let provider = create_provider(&config.provider.provider_type, &config.provider)?;
    let assistant = Assistant::new(Arc::from(provider));
    Ok(Studio::new(assistant, Translator::new(config.locale()), mode))
}

// Solve command handler
pub mod solve {
    //! One-shot homework solving.

    use super::*;
    use crate::providers::ImageData;
    use std::path::PathBuf;

    /// Solve a question and print the answer
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `prompt` - Question text
    /// * `image` - Optional image of the problem
    /// * `cheat_sheet` - Also print a cheat sheet
    /// * `practice` - Also print practice problems
    ///
    /// # Errors
    ///
    /// Returns error if the image cannot be read or any request fails
    pub async fn run_solve(
        config: Config,
        prompt: Option<String>,
        image: Option<PathBuf>,
        cheat_sheet: bool,
        practice: bool,
    ) -> Result<()> {
        let mut studio = build_studio(&config, Mode::Solver)?;
        let image = image.as_deref().map(ImageData::from_path).transpose()?;

        studio
            .solve(prompt.as_deref().unwrap_or_default(), image)
            .await?;
        print_solution(&studio);

        if cheat_sheet {
            studio.create_cheat_sheet().await?;
            if let Some(sheet) = &studio.solver().cheat_sheet.value {
                display::print_markdown(
                    Some(studio.translator().t("buttons.cheatSheet")),
                    sheet,
                    Flavor::Solution,
                    studio.translator(),
                );
            }
        }

        if practice {
            studio.generate_practice_problems().await?;
            if let Some(problems) = &studio.solver().practice.value {
                display::print_markdown(
                    Some(studio.translator().t("solutionDisplay.practiceProblems")),
                    problems,
                    Flavor::Solution,
                    studio.translator(),
                );
            }
        }

        Ok(())
    }

    pub(crate) fn print_solution(studio: &Studio) {
        if let Some(solution) = &studio.solver().solution.value {
            display::print_markdown(
                Some(studio.translator().t("solutionDisplay.solution")),
                solution,
                Flavor::Solution,
                studio.translator(),
            );
        }
    }
}

// Sketch command handler
pub mod sketch {
    //! One-shot sketch generation with optional edits.

    use super::*;
    use std::path::{Path, PathBuf};

    /// Generate a sketch, apply each edit in order, and save the result
    ///
    /// # Errors
    ///
    /// Returns error if generation, an edit, or writing the file fails
    pub async fn run_sketch(
        config: Config,
        prompt: String,
        edits: Vec<String>,
        output: PathBuf,
    ) -> Result<()> {
        let mut studio = build_studio(&config, Mode::Sketcher)?;

        studio.generate_sketch(&prompt).await?;
        for edit in &edits {
            tracing::info!("Applying edit: {}", edit);
            studio.edit_sketch(edit).await?;
        }

        save_sketch(&studio, &output)
    }

    /// Write the current sketch to `path`
    ///
    /// # Errors
    ///
    /// Returns a validation error when there is no sketch, or the write error
    pub fn save_sketch(studio: &Studio, path: &Path) -> Result<()> {
        let sketch = studio.sketcher().sketch.as_ref().ok_or_else(|| {
            crate::error::StudymateError::Validation(
                studio.translator().t("errors.noSketchToEdit").to_string(),
            )
        })?;
        sketch.write_to(path)?;
        println!("{} {}", studio.translator().t("sketchDisplay.saved"), path.display());
        Ok(())
    }
}

// Schedule command handler
pub mod schedule {
    //! One-shot schedule planning.

    use super::*;

    /// Plan a schedule and print it, as text or JSON
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply is not a valid schedule
    pub async fn run_schedule(config: Config, prompt: String, json: bool) -> Result<()> {
        let mut studio = build_studio(&config, Mode::Scheduler)?;
        studio.generate_schedule(&prompt).await?;

        if let Some(data) = studio.scheduler().store.data() {
            if json {
                println!("{}", serde_json::to_string_pretty(data)?);
            } else {
                display::print_schedule(data, studio.translator());
            }
        }
        Ok(())
    }
}

// Interactive session handler
pub mod chat {
    //! Interactive session.
    //!
    //! A readline loop where plain input goes to the active mode and `/`
    //! commands act on the studio. Failures are printed and the loop goes on.

    use super::*;
    use crate::assistant::ChatHistory;
    use crate::commands::special_commands::{
        parse_event_edit, parse_special_command, print_help, SpecialCommand,
    };
    use crate::render::StreamPrinter;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `mode` - Optional starting mode; defaults to the configured one
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be created, the mode is unknown,
    /// or the terminal cannot be read
    pub async fn run_chat(config: Config, mode: Option<String>) -> Result<()> {
        let initial_mode = match mode.as_deref() {
            Some(m) => Mode::parse_str(m).map_err(crate::error::StudymateError::Config)?,
            None => config.default_mode(),
        };
        tracing::info!("Starting interactive session in {} mode", initial_mode);

        let mut studio = build_studio(&config, initial_mode)?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&studio);

        loop {
            let prompt = format!("{} >> ", studio.mode().colored_tag(studio.translator()));
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    if command == SpecialCommand::Exit {
                        break;
                    }
                    if let Err(e) = handle_input(&mut studio, command, trimmed).await {
                        tracing::debug!("Command failed: {}", e);
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    return Err(e.into());
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Apply one line of input to the studio and print the outcome
    ///
    /// Errors are printed before being returned.
    pub async fn handle_input(studio: &mut Studio, command: SpecialCommand, line: &str) -> Result<()> {
        let result = dispatch(studio, command, line).await;
        if let Err(e) = &result {
            display::print_error("solutionDisplay.errorTitle", &e.to_string(), studio.translator());
        }
        result
    }

    async fn dispatch(studio: &mut Studio, command: SpecialCommand, line: &str) -> Result<()> {
        match command {
            SpecialCommand::SwitchMode(mode) => {
                if studio.set_mode(mode) {
                    println!("Switched to {} mode\n", mode.colored_tag(studio.translator()));
                    println!("{}\n", studio.translator().t(mode.placeholder_key()).dimmed());
                } else {
                    println!("Already in {} mode\n", mode.colored_tag(studio.translator()));
                }
                Ok(())
            }
            SpecialCommand::SwitchLocale(locale) => {
                studio.set_translator(Translator::new(locale));
                println!("Locale: {}\n", locale);
                Ok(())
            }
            SpecialCommand::ShowStatus => {
                println!("{}\n", display::format_status(studio));
                Ok(())
            }
            SpecialCommand::Help => {
                print_help();
                Ok(())
            }
            SpecialCommand::Show => {
                show_current(studio);
                Ok(())
            }
            SpecialCommand::AddEvent { day_index, draft } => {
                require_mode(studio, Mode::Scheduler)?;
                studio.add_event(day_index, draft)?;
                show_current(studio);
                Ok(())
            }
            SpecialCommand::DeleteEvent {
                day_index,
                event_id,
            } => {
                require_mode(studio, Mode::Scheduler)?;
                studio.delete_event(day_index, &event_id)?;
                show_current(studio);
                Ok(())
            }
            SpecialCommand::Edit(args) => match studio.mode() {
                Mode::Scheduler => {
                    let (day_index, event) = parse_event_edit(&args)
                        .map_err(|e| crate::error::StudymateError::Validation(e.to_string()))?;
                    studio.edit_event(day_index, event)?;
                    show_current(studio);
                    Ok(())
                }
                Mode::Sketcher => {
                    println!("{}\n", studio.translator().t("buttons.applying").dimmed());
                    studio.edit_sketch(&args).await?;
                    println!("{}\n", sketch_summary(studio));
                    Ok(())
                }
                _ => Err(unsupported_here("/edit", studio)),
            },
            SpecialCommand::CheatSheet => {
                require_mode(studio, Mode::Solver)?;
                println!("{}\n", studio.translator().t("solutionDisplay.creatingCheatSheet").dimmed());
                studio.create_cheat_sheet().await?;
                if let Some(sheet) = &studio.solver().cheat_sheet.value {
                    display::print_markdown(
                        Some(studio.translator().t("buttons.cheatSheet")),
                        sheet,
                        Flavor::Solution,
                        studio.translator(),
                    );
                }
                Ok(())
            }
            SpecialCommand::Practice => {
                require_mode(studio, Mode::Solver)?;
                println!(
                    "{}\n",
                    studio
                        .translator()
                        .t("solutionDisplay.generatingPracticeProblems")
                        .dimmed()
                );
                studio.generate_practice_problems().await?;
                if let Some(problems) = &studio.solver().practice.value {
                    display::print_markdown(
                        Some(studio.translator().t("solutionDisplay.practiceProblems")),
                        problems,
                        Flavor::Solution,
                        studio.translator(),
                    );
                }
                Ok(())
            }
            SpecialCommand::Save(path) => {
                require_mode(studio, Mode::Sketcher)?;
                sketch::save_sketch(studio, &path)
            }
            SpecialCommand::Exit => Ok(()),
            SpecialCommand::None => submit_prompt(studio, line).await,
        }
    }

    /// Send plain input to the active mode
    async fn submit_prompt(studio: &mut Studio, line: &str) -> Result<()> {
        let busy = studio.translator().t(studio.mode().busy_key()).dimmed();
        match studio.mode() {
            Mode::Solver => {
                println!("{}\n", busy);
                studio.solve(line, None).await?;
                solve::print_solution(studio);
                Ok(())
            }
            Mode::Sketcher => {
                println!("{}\n", busy);
                studio.generate_sketch(line).await?;
                println!("{}\n", sketch_summary(studio));
                Ok(())
            }
            Mode::Scheduler => {
                println!("{}\n", busy);
                studio.generate_schedule(line).await?;
                show_current(studio);
                Ok(())
            }
            Mode::Tutor => stream_tutor_reply(studio, line).await,
        }
    }

    /// Run a tutor turn, printing the reply while it streams
    async fn stream_tutor_reply(studio: &mut Studio, line: &str) -> Result<()> {
        let mut printer = StreamPrinter::new(Flavor::Tutor, *studio.translator());
        let mut stdout = std::io::stdout();

        let result = studio
            .send_tutor_message(line, |history: &ChatHistory| {
                if let Some(last) = history.last() {
                    if last.role == crate::assistant::Role::Model {
                        if let Err(e) = printer.update(&mut stdout, &last.text) {
                            tracing::warn!("Failed to print tutor reply: {}", e);
                        }
                    }
                }
            })
            .await;

        if result.is_ok() {
            if let Some(last) = studio.tutor().history().last() {
                printer.finish(&mut stdout, &last.text)?;
            }
        }
        result
    }

    fn show_current(studio: &Studio) {
        let t = studio.translator();
        match studio.mode() {
            Mode::Solver => solve::print_solution(studio),
            Mode::Sketcher => println!("{}\n", sketch_summary(studio)),
            Mode::Scheduler => match studio.scheduler().store.data() {
                Some(data) => display::print_schedule(data, t),
                None => println!("{}\n", t.t("scheduleDisplay.placeholderTitle").dimmed()),
            },
            Mode::Tutor => {
                for message in studio.tutor().history().messages() {
                    match message.role {
                        crate::assistant::Role::User => println!("{} {}\n", ">>".green().bold(), message.text),
                        crate::assistant::Role::Model => {
                            display::print_markdown(None, &message.text, Flavor::Tutor, t)
                        }
                    }
                }
            }
        }
    }

    fn sketch_summary(studio: &Studio) -> String {
        let t = studio.translator();
        match &studio.sketcher().sketch {
            Some(sketch) => format!(
                "{} [{}]\n{}",
                t.t("sketchDisplay.editTitle").bold(),
                sketch.mime_type,
                "/edit <instruction>, /save <path>".dimmed()
            ),
            None => t.t("sketchDisplay.placeholderTitle").dimmed().to_string(),
        }
    }

    fn require_mode(studio: &Studio, mode: Mode) -> Result<()> {
        if studio.mode() != mode {
            return Err(crate::error::StudymateError::Validation(format!(
                "This command is only available in {} mode",
                studio.translator().t(mode.label_key())
            ))
            .into());
        }
        Ok(())
    }

    fn unsupported_here(command: &str, studio: &Studio) -> anyhow::Error {
        crate::error::StudymateError::Validation(format!(
            "{} is not available in {} mode",
            command,
            studio.translator().t(studio.mode().label_key())
        ))
        .into()
    }

    fn print_welcome_banner(studio: &Studio) {
        let t = studio.translator();
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                Studymate Interactive Session                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Mode: {}", studio.mode().colored_tag(t));
        println!("{}\n", t.t(studio.mode().placeholder_key()).dimmed());
        println!("{}", t.t("disclaimer.accuracy").dimmed());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

}
