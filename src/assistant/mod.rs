//! Assistant operations
//!
//! [`Assistant`] turns user input into provider calls: it detects the input
//! language, picks the matching system instruction, and converts replies into
//! the types the rest of the crate works with. The tutor lives in [`tutor`].

pub mod tutor;

pub use tutor::{ChatHistory, ChatMessage, Role, TutorDriver};

use crate::error::{Result, StudymateError};
use crate::i18n::Locale;
use crate::prompts;
use crate::providers::{ImageData, ImageRequest, Provider, TextRequest};
use crate::schedule::ScheduleData;
use std::sync::Arc;

/// Language assumed when detection is impossible or fails
pub const DEFAULT_LANGUAGE: &str = "English";

/// Longest detection reply (in characters, exclusive) accepted as a language name
const MAX_LANGUAGE_NAME_CHARS: usize = 25;

/// Detect the language `prompt` is written in
///
/// Never fails: a blank prompt, a provider error, or a reply that does not
/// look like a language name all yield [`DEFAULT_LANGUAGE`].
///
/// # Examples
///
/// ```
/// use studymate::assistant::detect_language;
/// use studymate::providers::FakeProvider;
///
/// # tokio_test::block_on(async {
/// let provider = FakeProvider::new().with_language("Russian");
/// assert_eq!(detect_language(&provider, "Привет").await, "Russian");
/// assert_eq!(detect_language(&provider, "   ").await, "English");
/// # });
/// ```
pub async fn detect_language(provider: &dyn Provider, prompt: &str) -> String {
    if prompt.trim().is_empty() {
        return DEFAULT_LANGUAGE.to_string();
    }

    let request = TextRequest::new(prompt)
        .with_system_instruction(prompts::LANGUAGE_DETECTION_INSTRUCTION)
        .without_thinking();

    match provider.generate_text(&request).await {
        Ok(reply) => {
            let language = reply.trim();
            if !language.is_empty() && language.chars().count() < MAX_LANGUAGE_NAME_CHARS {
                tracing::debug!("Detected language: {}", language);
                language.to_string()
            } else {
                tracing::warn!(
                    "Unusual language detection reply, using {}: {:?}",
                    DEFAULT_LANGUAGE,
                    language
                );
                DEFAULT_LANGUAGE.to_string()
            }
        }
        Err(e) => {
            tracing::warn!("Language detection failed, using {}: {}", DEFAULT_LANGUAGE, e);
            DEFAULT_LANGUAGE.to_string()
        }
    }
}

/// Entry point for every remote study operation
///
/// Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct Assistant {
    provider: Arc<dyn Provider>,
}

impl Assistant {
    /// Create an assistant over a provider
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Underlying provider
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// See [`detect_language`]
    pub async fn detect_language(&self, prompt: &str) -> String {
        detect_language(self.provider.as_ref(), prompt).await
    }

    /// Solve a homework question given as text, an image, or both
    ///
    /// The answer language follows the prompt. With an image and no prompt it
    /// follows `ui_locale` instead.
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Validation` when both prompt and image are
    /// missing, or the provider error
    pub async fn solve_homework(
        &self,
        prompt: &str,
        image: Option<&ImageData>,
        ui_locale: Locale,
    ) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() && image.is_none() {
            return Err(StudymateError::Validation("No prompt or image provided.".to_string()).into());
        }

        let language = if prompt.is_empty() {
            ui_locale.language_name().to_string()
        } else {
            self.detect_language(prompt).await
        };
        tracing::info!(
            "Solving homework in {} (image attached: {})",
            language,
            image.is_some()
        );

        let text = if prompt.is_empty() {
            prompts::DEFAULT_IMAGE_PROMPT
        } else {
            prompt
        };
        let mut request =
            TextRequest::new(text).with_system_instruction(prompts::solver_instruction(&language));
        if let Some(image) = image {
            request = request.with_image(image.clone());
        }

        self.provider.generate_text(&request).await
    }

    /// Summarize a solution into a cheat sheet
    ///
    /// `context_prompt` is the question that produced the solution; it sets the
    /// output language.
    ///
    /// # Errors
    ///
    /// Returns the provider error
    pub async fn create_cheat_sheet(&self, solution: &str, context_prompt: &str) -> Result<String> {
        let language = self.detect_language(context_prompt).await;
        tracing::info!("Creating cheat sheet in {}", language);
        let request = TextRequest::new(solution)
            .with_system_instruction(prompts::cheat_sheet_instruction(&language));
        self.provider.generate_text(&request).await
    }

    /// Generate numbered practice problems similar to the original question
    ///
    /// # Errors
    ///
    /// Returns the provider error
    pub async fn generate_practice_problems(
        &self,
        original_prompt: &str,
        solution: &str,
    ) -> Result<String> {
        let language = self.detect_language(original_prompt).await;
        tracing::info!("Generating practice problems in {}", language);
        let request = TextRequest::new(prompts::practice_prompt(original_prompt, solution))
            .with_system_instruction(prompts::practice_instruction(&language));
        self.provider.generate_text(&request).await
    }

    /// Draw a square JPEG illustration of a concept
    ///
    /// # Errors
    ///
    /// Returns the provider error, or a provider error when no image came back
    pub async fn generate_sketch(&self, prompt: &str) -> Result<ImageData> {
        tracing::info!("Generating sketch");
        let request = ImageRequest::new(prompts::sketch_prompt(prompt.trim()));
        self.provider
            .generate_image(&request)
            .await?
            .ok_or_else(|| {
                StudymateError::Provider(
                    "Image generation failed. No images were returned.".to_string(),
                )
                .into()
            })
    }

    /// Apply a natural-language edit to an existing sketch
    ///
    /// # Errors
    ///
    /// Returns the provider error, or a provider error when the reply held no image
    pub async fn edit_sketch(&self, image: &ImageData, instruction: &str) -> Result<ImageData> {
        tracing::info!("Editing sketch");
        self.provider
            .edit_image(image, instruction.trim())
            .await?
            .ok_or_else(|| {
                StudymateError::Provider(
                    "Image editing failed. No edited image was returned.".to_string(),
                )
                .into()
            })
    }

    /// Plan a schedule from a free-form description
    ///
    /// Events the model returned without an id get a generated one.
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::ScheduleFormat` when the reply is not a valid
    /// schedule, or the provider error
    pub async fn generate_schedule(&self, prompt: &str) -> Result<ScheduleData> {
        let language = self.detect_language(prompt).await;
        tracing::info!("Generating schedule in {}", language);

        let request = TextRequest::new(prompt.trim())
            .with_system_instruction(prompts::schedule_instruction(&language));
        let reply = self
            .provider
            .generate_structured(&request, &prompts::schedule_schema())
            .await?;

        let mut schedule: ScheduleData = serde_json::from_str(reply.trim()).map_err(|e| {
            tracing::error!("Failed to parse schedule JSON: {}", e);
            StudymateError::ScheduleFormat
        })?;

        let filled = schedule.fill_missing_ids();
        if filled > 0 {
            tracing::debug!("Assigned ids to {} events", filled);
        }
        tracing::info!(
            "Schedule ready: {} days, {} events",
            schedule.len(),
            schedule.event_count()
        );
        Ok(schedule)
    }

    /// Start a fresh tutoring conversation
    pub fn tutor(&self) -> TutorDriver {
        TutorDriver::new(Arc::clone(&self.provider))
    }
}
