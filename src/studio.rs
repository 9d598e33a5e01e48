//! Interactive studio state
//!
//! [`Studio`] is the state behind an interactive session: the active mode,
//! the interface translator, and the results, progress flags and errors of
//! every mode. Switching to another mode clears all of it.
//!
//! Operations record their outcome in the state and also return it, so an
//! interactive front end can redraw from the state while one-shot commands
//! can just propagate the error.

use crate::assistant::{Assistant, ChatHistory, TutorDriver};
use crate::error::{Result, StudymateError};
use crate::i18n::Translator;
use crate::mode::Mode;
use crate::providers::ImageData;
use crate::schedule::{EventDraft, ScheduleEvent, ScheduleStore};

/// Result, progress flag and error of one remote operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<T> {
    pub value: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Task<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Task<T> {
    fn start(&mut self) {
        self.value = None;
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self, outcome: Result<T>) -> Result<()> {
        self.loading = false;
        match outcome {
            Ok(value) => {
                self.value = Some(value);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn reject(&mut self, message: &str) -> Result<()> {
        self.error = Some(message.to_string());
        Err(StudymateError::Validation(message.to_string()).into())
    }
}

/// Solver mode state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverState {
    /// Question the current solution answers
    pub prompt: String,
    pub solution: Task<String>,
    pub cheat_sheet: Task<String>,
    pub practice: Task<String>,
}

/// Sketcher mode state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SketcherState {
    /// Latest sketch; kept when a generation or edit fails
    pub sketch: Option<ImageData>,
    pub generating: bool,
    pub error: Option<String>,
    pub editing: bool,
    pub edit_error: Option<String>,
}

/// Scheduler mode state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub store: ScheduleStore,
    pub loading: bool,
    pub error: Option<String>,
}

/// State of an interactive session
pub struct Studio {
    assistant: Assistant,
    translator: Translator,
    mode: Mode,
    solver: SolverState,
    sketcher: SketcherState,
    scheduler: SchedulerState,
    tutor: TutorDriver,
}

impl Studio {
    /// Create a studio in `mode`
    pub fn new(assistant: Assistant, translator: Translator, mode: Mode) -> Self {
        let tutor = assistant.tutor();
        Self {
            assistant,
            translator,
            mode,
            solver: SolverState::default(),
            sketcher: SketcherState::default(),
            scheduler: SchedulerState::default(),
            tutor,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Change the interface language; mode state is kept
    pub fn set_translator(&mut self, translator: Translator) {
        self.translator = translator;
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn solver(&self) -> &SolverState {
        &self.solver
    }

    pub fn sketcher(&self) -> &SketcherState {
        &self.sketcher
    }

    pub fn scheduler(&self) -> &SchedulerState {
        &self.scheduler
    }

    pub fn tutor(&self) -> &TutorDriver {
        &self.tutor
    }

    /// Switch mode, clearing every mode's state
    ///
    /// Returns `false` and keeps everything when `mode` is already active.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        tracing::debug!("Switching mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.solver = SolverState::default();
        self.sketcher = SketcherState::default();
        self.scheduler = SchedulerState::default();
        self.tutor = self.assistant.tutor();
        true
    }

    /// Solve a question; clears the previous solution and its derivatives
    ///
    /// # Errors
    ///
    /// Returns a validation error when both prompt and image are missing, or
    /// the provider error
    pub async fn solve(&mut self, prompt: &str, image: Option<ImageData>) -> Result<()> {
        let prompt = prompt.trim();
        if prompt.is_empty() && image.is_none() {
            let message = self.translator.t("errors.noPrompt");
            return self.solver.solution.reject(message);
        }

        self.solver = SolverState {
            prompt: prompt.to_string(),
            ..SolverState::default()
        };
        self.solver.solution.start();
        let outcome = self
            .assistant
            .solve_homework(prompt, image.as_ref(), self.translator.locale())
            .await;
        self.solver.solution.finish(outcome)
    }

    /// Turn the current solution into a cheat sheet
    ///
    /// # Errors
    ///
    /// Returns a validation error when there is no solved text question, or
    /// the provider error
    pub async fn create_cheat_sheet(&mut self) -> Result<()> {
        let Some((prompt, solution)) = self.solved() else {
            let message = self.translator.t("errors.noSolution");
            return self.solver.cheat_sheet.reject(message);
        };

        self.solver.cheat_sheet.start();
        let outcome = self.assistant.create_cheat_sheet(&solution, &prompt).await;
        self.solver.cheat_sheet.finish(outcome)
    }

    /// Generate practice problems for the current solution
    ///
    /// # Errors
    ///
    /// Returns a validation error when there is no solved text question, or
    /// the provider error
    pub async fn generate_practice_problems(&mut self) -> Result<()> {
        let Some((prompt, solution)) = self.solved() else {
            let message = self.translator.t("errors.noSolution");
            return self.solver.practice.reject(message);
        };

        self.solver.practice.start();
        let outcome = self
            .assistant
            .generate_practice_problems(&prompt, &solution)
            .await;
        self.solver.practice.finish(outcome)
    }

    fn solved(&self) -> Option<(String, String)> {
        let solution = self.solver.solution.value.as_ref()?;
        if self.solver.prompt.is_empty() || solution.is_empty() {
            return None;
        }
        Some((self.solver.prompt.clone(), solution.clone()))
    }

    /// Generate a sketch; a failure keeps the previous one
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank prompt, or the provider error
    pub async fn generate_sketch(&mut self, prompt: &str) -> Result<()> {
        if prompt.trim().is_empty() {
            let message = self.translator.t("errors.noSketchPrompt");
            self.sketcher.error = Some(message.to_string());
            return Err(StudymateError::Validation(message.to_string()).into());
        }

        self.sketcher.generating = true;
        self.sketcher.error = None;
        self.sketcher.edit_error = None;
        let outcome = self.assistant.generate_sketch(prompt).await;
        self.sketcher.generating = false;

        match outcome {
            Ok(image) => {
                self.sketcher.sketch = Some(image);
                Ok(())
            }
            Err(e) => {
                self.sketcher.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Edit the current sketch; a failure keeps it unchanged
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank instruction or a missing sketch,
    /// or the provider error
    pub async fn edit_sketch(&mut self, instruction: &str) -> Result<()> {
        let checked = match (instruction.trim().is_empty(), self.sketcher.sketch.clone()) {
            (true, _) => Err("errors.noEditPrompt"),
            (false, None) => Err("errors.noSketchToEdit"),
            (false, Some(current)) => Ok(current),
        };
        let current = match checked {
            Ok(current) => current,
            Err(key) => {
                let message = self.translator.t(key);
                self.sketcher.edit_error = Some(message.to_string());
                return Err(StudymateError::Validation(message.to_string()).into());
            }
        };

        self.sketcher.editing = true;
        self.sketcher.edit_error = None;
        let outcome = self.assistant.edit_sketch(&current, instruction).await;
        self.sketcher.editing = false;

        match outcome {
            Ok(image) => {
                self.sketcher.sketch = Some(image);
                Ok(())
            }
            Err(e) => {
                self.sketcher.edit_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Generate a schedule, replacing the current one
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank prompt, or the provider or
    /// format error
    pub async fn generate_schedule(&mut self, prompt: &str) -> Result<()> {
        if prompt.trim().is_empty() {
            let message = self.translator.t("errors.noSchedulePrompt");
            self.scheduler.error = Some(message.to_string());
            return Err(StudymateError::Validation(message.to_string()).into());
        }

        self.scheduler.store.reset();
        self.scheduler.error = None;
        self.scheduler.loading = true;
        let outcome = self.assistant.generate_schedule(prompt).await;
        self.scheduler.loading = false;

        match outcome {
            Ok(schedule) => {
                self.scheduler.store.populate(schedule);
                Ok(())
            }
            Err(e) => {
                self.scheduler.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Add an event after validating the draft
    ///
    /// # Errors
    ///
    /// Returns a validation error for a draft without time or title or when
    /// no schedule exists, or the schedule error for a bad day index
    pub fn add_event(&mut self, day_index: usize, draft: EventDraft) -> Result<()> {
        draft.validate(&self.translator)?;
        self.require_schedule()?;
        self.scheduler.store.add(day_index, draft)
    }

    /// Replace an event's fields
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank time or title or when no
    /// schedule exists, or the schedule error for an unknown day or event
    pub fn edit_event(&mut self, day_index: usize, updated: ScheduleEvent) -> Result<()> {
        EventDraft::new(
            updated.time.as_str(),
            updated.title.as_str(),
            updated.description.as_str(),
        )
        .validate(&self.translator)?;
        self.require_schedule()?;
        self.scheduler.store.edit(day_index, updated)
    }

    /// Delete an event; an unknown id changes nothing
    ///
    /// # Errors
    ///
    /// Returns a validation error when no schedule exists, or the schedule
    /// error for a bad day index
    pub fn delete_event(&mut self, day_index: usize, event_id: &str) -> Result<()> {
        self.require_schedule()?;
        self.scheduler.store.delete(day_index, event_id)
    }

    fn require_schedule(&self) -> Result<()> {
        if self.scheduler.store.is_empty() {
            return Err(
                StudymateError::Validation(self.translator.t("errors.noSchedule").to_string())
                    .into(),
            );
        }
        Ok(())
    }

    /// Run one tutor turn; see [`TutorDriver::send`]
    ///
    /// # Errors
    ///
    /// Returns the error that ended the turn
    pub async fn send_tutor_message<F>(&mut self, prompt: &str, on_update: F) -> Result<()>
    where
        F: FnMut(&ChatHistory),
    {
        if prompt.trim().is_empty() {
            return Err(
                StudymateError::Validation(self.translator.t("errors.noPrompt").to_string())
                    .into(),
            );
        }
        self.tutor.send(prompt, on_update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::providers::FakeProvider;
    use crate::test_utils::{assert_error_contains, fake_studio};
    use std::sync::Arc;

    fn studio_with(fake: &FakeProvider, mode: Mode) -> Studio {
        Studio::new(
            Assistant::new(Arc::new(fake.clone())),
            Translator::new(Locale::En),
            mode,
        )
    }

    #[tokio::test]
    async fn test_solve_without_input_sets_translated_error() {
        let fake = FakeProvider::new();
        let mut studio = studio_with(&fake, Mode::Solver);
        studio.set_translator(Translator::new(Locale::Ru));

        assert!(studio.solve(" ", None).await.is_err());
        assert_eq!(
            studio.solver().solution.error.as_deref(),
            Some("Пожалуйста, введите вопрос или загрузите изображение.")
        );
        assert_eq!(fake.calls(), Default::default());
    }

    #[tokio::test]
    async fn test_solve_then_cheat_sheet_and_practice() {
        let fake = FakeProvider::new();
        fake.push_text("x = 2").push_text("- isolate x").push_text("1. x+2=5");
        let mut studio = studio_with(&fake, Mode::Solver);

        studio.solve("x+1=3", None).await.unwrap();
        studio.create_cheat_sheet().await.unwrap();
        studio.generate_practice_problems().await.unwrap();

        let solver = studio.solver();
        assert_eq!(solver.solution.value.as_deref(), Some("x = 2"));
        assert_eq!(solver.cheat_sheet.value.as_deref(), Some("- isolate x"));
        assert_eq!(solver.practice.value.as_deref(), Some("1. x+2=5"));
        assert!(!solver.solution.loading);
    }

    #[tokio::test]
    async fn test_cheat_sheet_requires_text_question() {
        let fake = FakeProvider::new();
        let mut studio = studio_with(&fake, Mode::Solver);

        studio
            .solve("", Some(ImageData::new("image/png", "AAAA")))
            .await
            .unwrap();
        assert!(studio.create_cheat_sheet().await.is_err());
        assert_eq!(
            studio.solver().cheat_sheet.error.as_deref(),
            Some("Solve a problem first.")
        );
    }

    #[tokio::test]
    async fn test_solve_failure_sets_error() {
        let fake = FakeProvider::new();
        fake.push_text_error("service unavailable");
        let mut studio = studio_with(&fake, Mode::Solver);

        assert!(studio.solve("2+2", None).await.is_err());
        let solution = &studio.solver().solution;
        assert!(solution.value.is_none());
        assert!(!solution.loading);
        assert!(solution.error.as_deref().unwrap().contains("service unavailable"));
    }

    #[tokio::test]
    async fn test_first_sketch_failure_leaves_sketch_empty() {
        let fake = FakeProvider::new();
        fake.push_image_error("quota exceeded");
        let mut studio = studio_with(&fake, Mode::Sketcher);

        assert!(studio.generate_sketch("a plant cell").await.is_err());
        let sketcher = studio.sketcher();
        assert!(sketcher.sketch.is_none());
        assert!(!sketcher.error.as_deref().unwrap().is_empty());
        assert!(!sketcher.generating);
    }

    #[tokio::test]
    async fn test_sketch_failure_keeps_previous_sketch() {
        let fake = FakeProvider::new();
        let first = ImageData::from_bytes("image/jpeg", b"first");
        fake.push_image(Some(first.clone())).push_image(None);
        let mut studio = studio_with(&fake, Mode::Sketcher);

        studio.generate_sketch("a cell").await.unwrap();
        assert!(studio.generate_sketch("a neuron").await.is_err());

        assert_eq!(studio.sketcher().sketch.as_ref(), Some(&first));
        assert!(studio
            .sketcher()
            .error
            .as_deref()
            .unwrap()
            .contains("No images were returned"));
    }

    #[tokio::test]
    async fn test_edit_sketch_validation_and_success() {
        let fake = FakeProvider::new();
        let mut studio = studio_with(&fake, Mode::Sketcher);

        assert!(studio.edit_sketch("add labels").await.is_err());
        assert_eq!(
            studio.sketcher().edit_error.as_deref(),
            Some("There is no sketch to edit.")
        );

        studio.generate_sketch("a cell").await.unwrap();
        assert!(studio.edit_sketch("  ").await.is_err());
        assert_eq!(
            studio.sketcher().edit_error.as_deref(),
            Some("Please describe how you want to edit the sketch.")
        );

        studio.edit_sketch("add labels").await.unwrap();
        let sketch = studio.sketcher().sketch.as_ref().unwrap();
        assert_eq!(sketch.decode().unwrap(), b"fake-edited-image");
        assert!(studio.sketcher().edit_error.is_none());
    }

    #[tokio::test]
    async fn test_edit_without_sketch_is_rejected_before_any_request() {
        let (fake, mut studio) = fake_studio(Mode::Sketcher);

        assert_error_contains(
            studio.edit_sketch("add labels").await,
            "There is no sketch to edit.",
        );
        assert_error_contains(
            studio.edit_sketch(" ").await,
            "Please describe how you want to edit the sketch.",
        );

        assert!(studio.sketcher().sketch.is_none());
        assert!(!studio.sketcher().editing);
        assert_eq!(fake.calls().edit, 0);
    }

    #[tokio::test]
    async fn test_schedule_generation_and_mutations() {
        let fake = FakeProvider::new();
        let mut studio = studio_with(&fake, Mode::Scheduler);

        assert!(studio
            .add_event(0, EventDraft::new("10:00 AM", "Read", ""))
            .is_err());

        studio.generate_schedule("Plan Monday").await.unwrap();
        studio
            .add_event(0, EventDraft::new("08:00 AM", "Breakfast", ""))
            .unwrap();

        let data = studio.scheduler().store.data().unwrap();
        let titles: Vec<&str> = data.day(0).unwrap().events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Breakfast", "Study"]);

        let err = studio
            .add_event(0, EventDraft::new(" ", "Nap", ""))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in at least the time and title for the event."
        );

        studio.delete_event(0, "event-1").unwrap();
        assert_eq!(studio.scheduler().store.data().unwrap().event_count(), 1);
    }

    #[tokio::test]
    async fn test_schedule_format_error_is_recorded() {
        let fake = FakeProvider::new();
        fake.push_structured("not json");
        let mut studio = studio_with(&fake, Mode::Scheduler);

        assert!(studio.generate_schedule("week").await.is_err());
        assert!(studio.scheduler().store.is_empty());
        assert_eq!(
            studio.scheduler().error.as_deref(),
            Some("The AI returned an invalid schedule format. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_mode_switch_resets_everything() {
        let fake = FakeProvider::new();
        let mut studio = studio_with(&fake, Mode::Solver);

        studio.solve("2+2", None).await.unwrap();
        studio.send_tutor_message("hi", |_| {}).await.unwrap();
        assert!(!studio.tutor().history().is_empty());

        assert!(!studio.set_mode(Mode::Solver));
        assert!(studio.solver().solution.value.is_some());

        assert!(studio.set_mode(Mode::Tutor));
        assert_eq!(studio.mode(), Mode::Tutor);
        assert!(studio.solver().solution.value.is_none());
        assert!(studio.tutor().history().is_empty());
        assert!(!studio.tutor().has_session());
    }
}
