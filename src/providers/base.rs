//! Base provider trait and common types for Studymate
//!
//! This module defines the Provider trait that all AI providers must implement,
//! the chat session trait used by the tutor, and the request and payload types
//! shared by every provider.

use crate::error::{Result, StudymateError};
use async_trait::async_trait;
use base64::Engine as _;
use futures::Stream;
use std::path::Path;
use std::pin::Pin;

/// Opaque image payload
///
/// Images are never decoded locally; they travel as base64 text together with
/// their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl ImageData {
    /// Wrap already encoded data
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use studymate::providers::ImageData;
    ///
    /// let image = ImageData::from_bytes("image/png", b"abc");
    /// assert_eq!(image.data, "YWJj");
    /// assert_eq!(image.decode().unwrap(), b"abc");
    /// ```
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }

    /// Read an image file, inferring the MIME type from the extension
    ///
    /// # Errors
    ///
    /// Returns error if the extension is not a supported image type or the
    /// file cannot be read
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let mime_type = mime_type_for_extension(&extension).ok_or_else(|| {
            StudymateError::Validation(format!(
                "Unsupported image type: {}",
                path.display()
            ))
        })?;
        let bytes = std::fs::read(path)?;
        tracing::debug!("Loaded {} bytes of {} from {}", bytes.len(), mime_type, path.display());
        Ok(Self::from_bytes(mime_type, &bytes))
    }

    /// Decode the base64 payload
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Provider` if the payload is not valid base64
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| StudymateError::Provider(format!("Invalid image data: {}", e)).into())
    }

    /// Decode and write the image to `path`
    ///
    /// # Errors
    ///
    /// Returns error if decoding or writing fails
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.decode()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// One-shot text generation request
///
/// When both are present, the image part is sent before the text part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRequest {
    /// Instruction fixing the model's role and output language
    pub system_instruction: Option<String>,
    /// User text
    pub prompt: Option<String>,
    /// Optional image attachment
    pub image: Option<ImageData>,
    /// Ask the model to skip extended reasoning
    pub disable_thinking: bool,
}

impl TextRequest {
    /// Create a request with user text
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// Set the system instruction
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Attach an image
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }

    /// Disable extended reasoning
    pub fn without_thinking(mut self) -> Self {
        self.disable_thinking = true;
        self
    }
}

/// Image generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Full image prompt
    pub prompt: String,
    /// Output MIME type
    pub mime_type: String,
    /// Output aspect ratio, e.g. `1:1`
    pub aspect_ratio: String,
}

impl ImageRequest {
    /// Square JPEG request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mime_type: "image/jpeg".to_string(),
            aspect_ratio: "1:1".to_string(),
        }
    }
}

/// Stream of text deltas from a chat reply
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A stateful chat with a fixed persona
///
/// The session remembers earlier turns; callers only send the new message.
#[async_trait]
pub trait ChatSession: Send {
    /// Send a message and stream the reply
    ///
    /// # Arguments
    ///
    /// * `message` - User message for this turn
    ///
    /// # Returns
    ///
    /// Returns a stream of text deltas; concatenated in order they form the reply
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be started. Failures after the
    /// stream has started are yielded as `Err` items.
    async fn send_message_stream(&mut self, message: &str) -> Result<TextStream>;
}

/// Provider trait for AI providers
///
/// All AI providers (Gemini, the in-process fake) implement this trait. Every
/// capability the assistant needs from the remote model goes through it.
///
/// # Examples
///
/// ```no_run
/// use studymate::providers::{create_provider, Provider, TextRequest};
/// use studymate::config::ProviderConfig;
///
/// # async fn example() -> studymate::error::Result<()> {
/// let mut config = ProviderConfig::default();
/// config.provider_type = "fake".to_string();
/// let provider = create_provider(&config.provider_type, &config)?;
/// let reply = provider.generate_text(&TextRequest::new("What is 2+2?")).await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate text, optionally conditioned on an image
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or response is invalid
    async fn generate_text(&self, request: &TextRequest) -> Result<String>;

    /// Generate JSON text constrained by `schema`
    ///
    /// The returned text is not parsed here; callers own the target type.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails
    async fn generate_structured(
        &self,
        request: &TextRequest,
        schema: &serde_json::Value,
    ) -> Result<String>;

    /// Generate an image
    ///
    /// # Returns
    ///
    /// Returns `None` when the call succeeded but produced no image
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails
    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<ImageData>>;

    /// Edit an existing image following a natural-language instruction
    ///
    /// # Returns
    ///
    /// Returns `None` when the reply contained no image part
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails
    async fn edit_image(&self, image: &ImageData, instruction: &str) -> Result<Option<ImageData>>;

    /// Open a chat session configured with a persona instruction
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be created
    async fn start_chat(&self, system_instruction: &str) -> Result<Box<dyn ChatSession>>;

    /// Name of the text model in use
    fn model_name(&self) -> String;
}
