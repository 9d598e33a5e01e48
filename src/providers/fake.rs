//! In-process fake provider
//!
//! [`FakeProvider`] answers every [`Provider`] call from scripted queues and
//! records what it was asked. It backs the `fake` provider type, which lets
//! the CLI run without network access, and it drives the assistant tests.
//!
//! When a queue is empty the fake falls back to a deterministic default:
//!
//! - language detection answers `English`
//! - text generation answers `## Answer` followed by the prompt
//! - structured generation answers a one-day sample schedule
//! - image generation and editing answer a tiny JPEG-tagged payload
//! - chat replies echo the message in two deltas
//!
//! # Example
//!
//! ```
//! use studymate::providers::{FakeProvider, Provider, TextRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fake = FakeProvider::new();
//! fake.push_text("x = 2");
//!
//! let reply = fake.generate_text(&TextRequest::new("x + 1 = 3")).await.unwrap();
//! assert_eq!(reply, "x = 2");
//! assert_eq!(fake.calls().text, 1);
//! # }
//! ```

use crate::error::{Result, StudymateError};
use crate::prompts::LANGUAGE_DETECTION_INSTRUCTION;
use crate::providers::{ChatSession, ImageData, ImageRequest, Provider, TextRequest, TextStream};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sample schedule returned by structured generation when nothing is scripted
pub const SAMPLE_SCHEDULE_JSON: &str = r#"[{"day":"Monday","events":[{"id":"event-1","time":"09:00 AM","title":"Study","description":"Review notes"}]}]"#;

/// Number of calls the fake has served, per capability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeCalls {
    /// Language detection requests
    pub detect: usize,
    /// Other text generation requests
    pub text: usize,
    /// Structured generation requests
    pub structured: usize,
    /// Image generation requests
    pub image: usize,
    /// Image edit requests
    pub edit: usize,
    /// Chat sessions opened
    pub chat_sessions: usize,
    /// Chat messages sent across all sessions
    pub chat_messages: usize,
}

struct ChatScript {
    deltas: Vec<String>,
    error: Option<String>,
}

#[derive(Default)]
struct FakeState {
    language: Option<String>,
    detect_error: Option<String>,
    text: VecDeque<std::result::Result<String, String>>,
    structured: VecDeque<std::result::Result<String, String>>,
    images: VecDeque<std::result::Result<Option<ImageData>, String>>,
    edits: VecDeque<std::result::Result<Option<ImageData>, String>>,
    chats: VecDeque<ChatScript>,
    start_chat_error: Option<String>,
    calls: FakeCalls,
    requests: Vec<TextRequest>,
    personas: Vec<String>,
    messages: Vec<String>,
}

fn scripted<T>(entry: std::result::Result<T, String>) -> Result<T> {
    entry.map_err(|message| StudymateError::Provider(message).into())
}

/// Scripted provider; clones share the same script and call log
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    /// Create a fake with empty queues
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Language name returned by detection
    pub fn with_language(self, language: impl Into<String>) -> Self {
        self.state().language = Some(language.into());
        self
    }

    /// Make language detection fail
    pub fn fail_detection(&self, message: impl Into<String>) -> &Self {
        self.state().detect_error = Some(message.into());
        self
    }

    /// Queue a text reply
    pub fn push_text(&self, reply: impl Into<String>) -> &Self {
        self.state().text.push_back(Ok(reply.into()));
        self
    }

    /// Queue a text failure
    pub fn push_text_error(&self, message: impl Into<String>) -> &Self {
        self.state().text.push_back(Err(message.into()));
        self
    }

    /// Queue a structured reply
    pub fn push_structured(&self, reply: impl Into<String>) -> &Self {
        self.state().structured.push_back(Ok(reply.into()));
        self
    }

    /// Queue a structured failure
    pub fn push_structured_error(&self, message: impl Into<String>) -> &Self {
        self.state().structured.push_back(Err(message.into()));
        self
    }

    /// Queue an image generation result; `None` means no image came back
    pub fn push_image(&self, image: Option<ImageData>) -> &Self {
        self.state().images.push_back(Ok(image));
        self
    }

    /// Queue an image generation failure
    pub fn push_image_error(&self, message: impl Into<String>) -> &Self {
        self.state().images.push_back(Err(message.into()));
        self
    }

    /// Queue an image edit result
    pub fn push_edit(&self, image: Option<ImageData>) -> &Self {
        self.state().edits.push_back(Ok(image));
        self
    }

    /// Queue an image edit failure
    pub fn push_edit_error(&self, message: impl Into<String>) -> &Self {
        self.state().edits.push_back(Err(message.into()));
        self
    }

    /// Queue a chat reply streamed as the given deltas
    pub fn push_chat<I, S>(&self, deltas: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().chats.push_back(ChatScript {
            deltas: deltas.into_iter().map(Into::into).collect(),
            error: None,
        });
        self
    }

    /// Queue a chat reply that fails after streaming the given deltas
    pub fn push_chat_error<I, S>(&self, deltas: I, message: impl Into<String>) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().chats.push_back(ChatScript {
            deltas: deltas.into_iter().map(Into::into).collect(),
            error: Some(message.into()),
        });
        self
    }

    /// Make opening a chat session fail
    pub fn fail_start_chat(&self, message: impl Into<String>) -> &Self {
        self.state().start_chat_error = Some(message.into());
        self
    }

    /// Calls served so far
    pub fn calls(&self) -> FakeCalls {
        self.state().calls.clone()
    }

    /// Text and structured requests received, detection included
    pub fn requests(&self) -> Vec<TextRequest> {
        self.state().requests.clone()
    }

    /// Persona instructions of every opened chat session
    pub fn personas(&self) -> Vec<String> {
        self.state().personas.clone()
    }

    /// Chat messages received, in order
    pub fn messages(&self) -> Vec<String> {
        self.state().messages.clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if request.system_instruction.as_deref() == Some(LANGUAGE_DETECTION_INSTRUCTION) {
            state.calls.detect += 1;
            if let Some(message) = &state.detect_error {
                return Err(StudymateError::Provider(message.clone()).into());
            }
            return Ok(state
                .language
                .clone()
                .unwrap_or_else(|| "English".to_string()));
        }

        state.calls.text += 1;
        match state.text.pop_front() {
            Some(entry) => scripted(entry),
            None => Ok(format!(
                "## Answer\n\n{}",
                request.prompt.as_deref().unwrap_or_default()
            )),
        }
    }

    async fn generate_structured(
        &self,
        request: &TextRequest,
        _schema: &serde_json::Value,
    ) -> Result<String> {
        let mut state = self.state();
        state.requests.push(request.clone());
        state.calls.structured += 1;
        match state.structured.pop_front() {
            Some(entry) => scripted(entry),
            None => Ok(SAMPLE_SCHEDULE_JSON.to_string()),
        }
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<ImageData>> {
        let mut state = self.state();
        state.calls.image += 1;
        tracing::debug!("Fake image request: {}", request.prompt);
        match state.images.pop_front() {
            Some(entry) => scripted(entry),
            None => Ok(Some(ImageData::from_bytes(
                request.mime_type.clone(),
                b"fake-image",
            ))),
        }
    }

    async fn edit_image(&self, image: &ImageData, _instruction: &str) -> Result<Option<ImageData>> {
        let mut state = self.state();
        state.calls.edit += 1;
        match state.edits.pop_front() {
            Some(entry) => scripted(entry),
            None => Ok(Some(ImageData::from_bytes(
                image.mime_type.clone(),
                b"fake-edited-image",
            ))),
        }
    }

    async fn start_chat(&self, system_instruction: &str) -> Result<Box<dyn ChatSession>> {
        let mut state = self.state();
        if let Some(message) = &state.start_chat_error {
            return Err(StudymateError::Provider(message.clone()).into());
        }
        state.calls.chat_sessions += 1;
        state.personas.push(system_instruction.to_string());
        Ok(Box::new(FakeChatSession {
            state: Arc::clone(&self.state),
        }))
    }

    fn model_name(&self) -> String {
        "fake".to_string()
    }
}

struct FakeChatSession {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl ChatSession for FakeChatSession {
    async fn send_message_stream(&mut self, message: &str) -> Result<TextStream> {
        let script = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.chat_messages += 1;
            state.messages.push(message.to_string());
            state.chats.pop_front()
        };

        let script = script.unwrap_or_else(|| ChatScript {
            deltas: vec!["You said: ".to_string(), message.to_string()],
            error: None,
        });

        let mut items: Vec<Result<String>> = script.deltas.into_iter().map(Ok).collect();
        if let Some(error) = script.error {
            items.push(Err(StudymateError::Provider(error).into()));
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn detection_request(text: &str) -> TextRequest {
        TextRequest::new(text)
            .with_system_instruction(LANGUAGE_DETECTION_INSTRUCTION)
            .without_thinking()
    }

    #[tokio::test]
    async fn test_detection_is_counted_separately() {
        let fake = FakeProvider::new().with_language("Russian");

        let language = fake.generate_text(&detection_request("привет")).await.unwrap();
        assert_eq!(language, "Russian");

        fake.generate_text(&TextRequest::new("hello")).await.unwrap();
        let calls = fake.calls();
        assert_eq!(calls.detect, 1);
        assert_eq!(calls.text, 1);
        assert_eq!(fake.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_queues_are_fifo_then_default() {
        let fake = FakeProvider::new();
        fake.push_text("first").push_text_error("down");

        let request = TextRequest::new("q");
        assert_eq!(fake.generate_text(&request).await.unwrap(), "first");
        assert!(fake.generate_text(&request).await.is_err());
        assert_eq!(fake.generate_text(&request).await.unwrap(), "## Answer\n\nq");
    }

    #[tokio::test]
    async fn test_default_structured_reply_is_sample_schedule() {
        let fake = FakeProvider::new();
        let reply = fake
            .generate_structured(&TextRequest::new("week"), &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(reply, SAMPLE_SCHEDULE_JSON);
    }

    #[tokio::test]
    async fn test_image_scripts() {
        let fake = FakeProvider::new();
        fake.push_image(None).push_image_error("quota");

        let request = ImageRequest::new("cell");
        assert!(fake.generate_image(&request).await.unwrap().is_none());
        assert!(fake.generate_image(&request).await.is_err());
        let image = fake.generate_image(&request).await.unwrap().unwrap();
        assert_eq!(image.decode().unwrap(), b"fake-image");
        assert_eq!(fake.calls().image, 3);
    }

    #[tokio::test]
    async fn test_chat_scripts_and_echo() {
        let fake = FakeProvider::new();
        fake.push_chat(["Hi", " there"])
            .push_chat_error(["Par"], "connection reset");

        let mut session = fake.start_chat("persona").await.unwrap();

        let deltas: Vec<String> = session
            .send_message_stream("one")
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["Hi", " there"]);

        let items: Vec<Result<String>> = session.send_message_stream("two").await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());

        let deltas: Vec<String> = session
            .send_message_stream("three")
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(deltas.concat(), "You said: three");

        assert_eq!(fake.calls().chat_sessions, 1);
        assert_eq!(fake.messages(), vec!["one", "two", "three"]);
        assert_eq!(fake.personas(), vec!["persona"]);
    }

    #[tokio::test]
    async fn test_start_chat_failure() {
        let fake = FakeProvider::new();
        fake.fail_start_chat("no session");
        assert!(fake.start_chat("persona").await.is_err());
        assert_eq!(fake.calls().chat_sessions, 0);
    }
}
