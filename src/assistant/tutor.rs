//! Streaming tutor conversations
//!
//! [`TutorDriver`] owns one conversation: its history, its chat session and
//! the language that session was opened in. Each call to
//! [`TutorDriver::send`] runs one full turn.
//!
//! A turn:
//!
//! 1. appends the user message
//! 2. on the first turn only, detects the prompt language and opens a chat
//!    session with the tutor persona in that language
//! 3. appends an empty model message
//! 4. grows that message with every streamed delta, notifying the observer
//!    each time
//!
//! If any of steps 2 to 4 fails, the empty or partial model message is
//! removed, the user message stays, and the error is remembered.
//!
//! The driver takes `&mut self` for a turn, so a second turn cannot start
//! while one is running.

use crate::assistant::detect_language;
use crate::error::{Result, StudymateError};
use crate::prompts;
use crate::providers::{ChatSession, Provider};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Conversation history
///
/// Messages are only appended. While a reply streams in, the last message is
/// the single one whose text changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// All messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    fn set_last_text(&mut self, text: &str) {
        if let Some(last) = self.messages.last_mut() {
            last.text.clear();
            last.text.push_str(text);
        }
    }

    fn pop_model(&mut self) {
        if matches!(self.messages.last(), Some(m) if m.role == Role::Model) {
            self.messages.pop();
        }
    }
}

/// Drives a single tutoring conversation
pub struct TutorDriver {
    provider: Arc<dyn Provider>,
    session: Option<Box<dyn ChatSession>>,
    language: Option<String>,
    history: ChatHistory,
    error: Option<String>,
}

impl TutorDriver {
    /// Create a driver with no history and no session
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            session: None,
            language: None,
            history: ChatHistory::default(),
            error: None,
        }
    }

    /// Conversation so far
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Error of the last failed turn; cleared when a new turn starts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Language the session was opened in
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether a chat session is open
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Run one conversation turn
    ///
    /// `on_update` is called with the whole history after the user message is
    /// appended, after the placeholder is appended, after every delta, and
    /// once more after a rollback.
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Validation` for a blank prompt (nothing is
    /// appended), or the provider error that ended the turn
    pub async fn send<F>(&mut self, prompt: &str, mut on_update: F) -> Result<()>
    where
        F: FnMut(&ChatHistory),
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudymateError::Validation("Prompt is empty".to_string()).into());
        }

        self.error = None;
        self.history.push(ChatMessage::user(prompt));
        on_update(&self.history);

        let mut placeholder = false;
        let result = self.run_turn(prompt, &mut placeholder, &mut on_update).await;

        if let Err(e) = &result {
            tracing::warn!("Tutor turn failed: {}", e);
            if placeholder {
                self.history.pop_model();
            }
            self.error = Some(e.to_string());
            on_update(&self.history);
        }
        result
    }

    async fn run_turn<F>(&mut self, prompt: &str, placeholder: &mut bool, on_update: &mut F) -> Result<()>
    where
        F: FnMut(&ChatHistory),
    {
        if self.session.is_none() {
            let language = detect_language(self.provider.as_ref(), prompt).await;
            tracing::info!("Opening tutor session in {}", language);
            let session = self
                .provider
                .start_chat(&prompts::tutor_instruction(&language))
                .await?;
            self.session = Some(session);
            self.language = Some(language);
        }

        self.history.push(ChatMessage::model(""));
        *placeholder = true;
        on_update(&self.history);

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| StudymateError::Provider("Tutor session is not open".to_string()))?;
        let mut stream = session.send_message_stream(prompt).await?;

        let mut reply = String::new();
        while let Some(delta) = stream.next().await {
            reply.push_str(&delta?);
            self.history.set_last_text(&reply);
            on_update(&self.history);
        }

        tracing::debug!("Tutor reply complete: {} chars", reply.chars().count());
        Ok(())
    }
}
