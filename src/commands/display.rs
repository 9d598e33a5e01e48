//! Terminal output for command results
//!
//! Formatting functions return strings so they can be tested; the `print_*`
//! wrappers write them to stdout.

use crate::i18n::Translator;
use crate::mode::Mode;
use crate::render::{paint, render, Flavor};
use crate::schedule::ScheduleData;
use crate::studio::Studio;
use colored::Colorize;

/// Render a markdown response under an optional section title
pub fn format_markdown(
    title: Option<&str>,
    text: &str,
    flavor: Flavor,
    translator: &Translator,
) -> String {
    let body = paint(&render(text, false, flavor), translator);
    match title {
        Some(title) => format!("{}\n\n{}", title.bold().underline(), body),
        None => body,
    }
}

/// Print a markdown response under an optional section title
pub fn print_markdown(title: Option<&str>, text: &str, flavor: Flavor, translator: &Translator) {
    println!("{}\n", format_markdown(title, text, flavor, translator));
}

/// Numbered days with their events and ids
///
/// Days are numbered from 1, matching the scheduler commands.
pub fn format_schedule(schedule: &ScheduleData, translator: &Translator) -> String {
    let mut out = format!("{}\n", translator.t("scheduleDisplay.weeklyPlan").bold().underline());

    for (index, day) in schedule.days().iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", index + 1, day.day.bold()));
        if day.events.is_empty() {
            out.push_str(&format!("   {}\n", translator.t("scheduleDisplay.noEvents").dimmed()));
            continue;
        }
        for event in &day.events {
            out.push_str(&format!(
                "   {}  {}  {}",
                event.time.cyan(),
                event.title.bold(),
                format!("[{}]", event.id).dimmed()
            ));
            if !event.description.trim().is_empty() {
                out.push_str(&format!("\n      {}", event.description));
            }
            out.push('\n');
        }
    }
    out
}

/// Print the schedule
pub fn print_schedule(schedule: &ScheduleData, translator: &Translator) {
    println!("{}", format_schedule(schedule, translator));
}

/// Print an error under a translated title
pub fn print_error(title_key: &str, message: &str, translator: &Translator) {
    eprintln!("{}: {}\n", translator.t(title_key).red().bold(), message);
}

/// Summary of the active mode and what it currently holds
pub fn format_status(studio: &Studio) -> String {
    let t = studio.translator();
    let mut lines = vec![
        format!("Mode:     {}", studio.mode().colored_tag(t)),
        format!("Locale:   {}", t.locale()),
        format!("Model:    {}", studio.assistant().provider().model_name()),
    ];

    match studio.mode() {
        Mode::Solver => {
            let solver = studio.solver();
            lines.push(format!("Solution: {}", yes_no(solver.solution.value.is_some())));
            lines.push(format!("Cheat sheet: {}", yes_no(solver.cheat_sheet.value.is_some())));
            lines.push(format!("Practice: {}", yes_no(solver.practice.value.is_some())));
        }
        Mode::Sketcher => {
            lines.push(format!("Sketch:   {}", yes_no(studio.sketcher().sketch.is_some())));
        }
        Mode::Scheduler => {
            let summary = match studio.scheduler().store.data() {
                Some(data) => format!("{} days, {} events", data.len(), data.event_count()),
                None => "none".to_string(),
            };
            lines.push(format!("Schedule: {}", summary));
        }
        Mode::Tutor => {
            let tutor = studio.tutor();
            lines.push(format!("Messages: {}", tutor.history().len()));
            if let Some(language) = tutor.language() {
                lines.push(format!("Language: {}", language));
            }
        }
    }

    lines.join("\n")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
