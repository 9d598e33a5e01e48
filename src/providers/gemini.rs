//! Google Gemini provider implementation for Studymate
//!
//! This module implements the Provider trait over the Gemini REST API:
//!
//! - `models/{model}:generateContent` for text, structured output and image edits
//! - `models/{model}:streamGenerateContent?alt=sse` for tutor chat replies
//! - `models/{model}:predict` for image generation
//!
//! Every request carries the API key in the `x-goog-api-key` header.

use crate::config::GeminiConfig;
use crate::error::{Result, StudymateError};
use crate::providers::{ChatSession, ImageData, ImageRequest, Provider, TextRequest, TextStream};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use studymate::config::GeminiConfig;
/// use studymate::providers::{GeminiProvider, Provider, TextRequest};
///
/// # async fn example() -> studymate::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("your-key".to_string()),
///     ..GeminiConfig::default()
/// };
/// let provider = GeminiProvider::new(config)?;
/// let answer = provider.generate_text(&TextRequest::new("What is 2+2?")).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    api: ApiClient,
    config: GeminiConfig,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// HTTP client bound to an API key
#[derive(Clone)]
struct ApiClient {
    http: Client,
    api_key: String,
}

impl ApiClient {
    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                StudymateError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(StudymateError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(response)
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R> {
        let response = self.post(url, body).await?;
        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            StudymateError::Provider(format!("Failed to parse Gemini response: {}", e)).into()
        })
    }
}

/// Request body for generateContent and streamGenerateContent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

/// Role-tagged list of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn instruction(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    fn model(text: &str) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    fn image(image: &ImageData) -> Self {
        Self {
            inline_data: Some(Blob {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

/// Response body of generateContent, also one SSE event of a stream
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Turn in-band errors and blocked prompts into provider errors
    fn checked(self) -> Result<Self> {
        if let Some(error) = &self.error {
            return Err(StudymateError::Provider(format!(
                "Gemini returned error {}: {}",
                error.code, error.message
            ))
            .into());
        }
        if self.candidates.is_empty() {
            if let Some(reason) = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                return Err(
                    StudymateError::Provider(format!("Request was blocked: {}", reason)).into(),
                );
            }
        }
        Ok(self)
    }

    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated answer text, reasoning parts excluded
    fn text(&self) -> String {
        self.parts()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    fn first_image(&self) -> Option<ImageData> {
        self.parts()
            .find_map(|p| p.inline_data.as_ref())
            .map(|blob| ImageData::new(blob.mime_type.clone(), blob.data.clone()))
    }
}

/// Request body for the image generation predict endpoint
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: String,
}

#[derive(Debug, Default, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::MissingCredentials` if no API key is set, or an
    /// error if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StudymateError::MissingCredentials(
                    "gemini (set GEMINI_API_KEY or provider.gemini.api_key)".to_string(),
                )
            })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("studymate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StudymateError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, text_model={}",
            config.api_base,
            config.text_model
        );

        Ok(Self {
            api: ApiClient { http, api_key },
            config,
        })
    }

    /// Configured API base URL
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    fn endpoint(&self, model: &str, action: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            model,
            action
        )
    }

    fn build_request(request: &TextRequest, generation_config: GenerationConfig) -> GenerateContentRequest {
        let mut parts = Vec::new();
        if let Some(image) = &request.image {
            parts.push(Part::image(image));
        }
        if let Some(prompt) = &request.prompt {
            parts.push(Part::text(prompt));
        }

        let mut generation_config = generation_config;
        if request.disable_thinking {
            generation_config.thinking_config = Some(ThinkingConfig { thinking_budget: 0 });
        }
        let has_config = generation_config.response_mime_type.is_some()
            || generation_config.response_modalities.is_some()
            || generation_config.thinking_config.is_some();

        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(Content::instruction),
            generation_config: has_config.then_some(generation_config),
        }
    }

    async fn generate_content(&self, model: &str, body: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model, "generateContent");
        tracing::debug!("Sending Gemini request to {}: {} parts", model, body.contents.iter().map(|c| c.parts.len()).sum::<usize>());
        let response: GenerateContentResponse = self.api.post_json(&url, body).await?;
        let response = response.checked()?;
        if let Some(reason) = response.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            tracing::debug!("Gemini finish reason: {}", reason);
        }
        Ok(response)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let body = Self::build_request(request, GenerationConfig::default());
        let response = self.generate_content(&self.config.text_model, &body).await?;
        Ok(response.text())
    }

    async fn generate_structured(
        &self,
        request: &TextRequest,
        schema: &serde_json::Value,
    ) -> Result<String> {
        let body = Self::build_request(
            request,
            GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema.clone()),
                ..GenerationConfig::default()
            },
        );
        let response = self.generate_content(&self.config.text_model, &body).await?;
        Ok(response.text())
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<ImageData>> {
        let url = self.endpoint(&self.config.image_model, "predict");
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: request.aspect_ratio.clone(),
                output_options: OutputOptions {
                    mime_type: request.mime_type.clone(),
                },
            },
        };

        tracing::debug!("Requesting image from {}", self.config.image_model);
        let response: PredictResponse = self.api.post_json(&url, &body).await?;

        Ok(response.predictions.into_iter().find_map(|p| {
            let data = p.bytes_base64_encoded?;
            let mime_type = p.mime_type.unwrap_or_else(|| request.mime_type.clone());
            Some(ImageData::new(mime_type, data))
        }))
    }

    async fn edit_image(&self, image: &ImageData, instruction: &str) -> Result<Option<ImageData>> {
        let request = TextRequest::new(instruction).with_image(image.clone());
        let body = Self::build_request(
            &request,
            GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
                ..GenerationConfig::default()
            },
        );
        let response = self
            .generate_content(&self.config.image_edit_model, &body)
            .await?;
        Ok(response.first_image())
    }

    async fn start_chat(&self, system_instruction: &str) -> Result<Box<dyn ChatSession>> {
        tracing::debug!("Starting Gemini chat session on {}", self.config.text_model);
        Ok(Box::new(GeminiChatSession {
            api: self.api.clone(),
            url: format!(
                "{}?alt=sse",
                self.endpoint(&self.config.text_model, "streamGenerateContent")
            ),
            system_instruction: Content::instruction(system_instruction),
            history: Arc::new(RwLock::new(Vec::new())),
        }))
    }

    fn model_name(&self) -> String {
        self.config.text_model.clone()
    }
}

/// Streaming chat over streamGenerateContent
///
/// The session keeps the conversation history and resends it with each
/// message. A turn is added to the history only once its reply stream has
/// ended without error.
struct GeminiChatSession {
    api: ApiClient,
    url: String,
    system_instruction: Content,
    history: Arc<RwLock<Vec<Content>>>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message_stream(&mut self, message: &str) -> Result<TextStream> {
        let user = Content::user(vec![Part::text(message)]);
        let contents = {
            let history = self.history.read().map_err(|_| {
                StudymateError::Provider("Failed to acquire read lock on chat history".to_string())
            })?;
            let mut contents = history.clone();
            contents.push(user.clone());
            contents
        };

        let body = GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: None,
        };
        tracing::debug!("Sending Gemini chat message: {} turns", body.contents.len());

        let response = self.api.post(&self.url, &body).await?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tokio::spawn(parse_sse_stream(response.bytes_stream(), events_tx));

        let state = ReplyState {
            events: events_rx,
            history: Arc::clone(&self.history),
            user: Some(user),
            reply: String::new(),
            finished: false,
        };
        Ok(Box::pin(futures::stream::unfold(state, next_delta)))
    }
}

struct ReplyState {
    events: mpsc::UnboundedReceiver<Result<String>>,
    history: Arc<RwLock<Vec<Content>>>,
    user: Option<Content>,
    reply: String,
    finished: bool,
}

impl ReplyState {
    fn commit(&mut self) {
        if let Some(user) = self.user.take() {
            if let Ok(mut history) = self.history.write() {
                history.push(user);
                history.push(Content::model(&self.reply));
            }
        }
    }
}

async fn next_delta(mut state: ReplyState) -> Option<(Result<String>, ReplyState)> {
    if state.finished {
        return None;
    }
    loop {
        match state.events.recv().await {
            Some(Ok(data)) => match parse_stream_chunk(&data) {
                Ok(delta) if delta.is_empty() => continue,
                Ok(delta) => {
                    state.reply.push_str(&delta);
                    return Some((Ok(delta), state));
                }
                Err(e) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
            },
            Some(Err(e)) => {
                state.finished = true;
                return Some((Err(e), state));
            }
            None => {
                state.commit();
                state.finished = true;
                return None;
            }
        }
    }
}

fn parse_stream_chunk(data: &str) -> Result<String> {
    let chunk: GenerateContentResponse = serde_json::from_str(data).map_err(|e| {
        tracing::error!("Failed to parse Gemini stream chunk: {}", e);
        StudymateError::Provider(format!("Failed to parse Gemini stream chunk: {}", e))
    })?;
    Ok(chunk.checked()?.text())
}

/// Parse an SSE byte stream and forward every `data:` payload to `events_tx`
///
/// Events are separated by blank lines. Carriage returns are dropped, so both
/// `\n\n` and `\r\n\r\n` separators work. Bytes are buffered until an event is
/// complete, which keeps multi-byte characters split across chunks intact.
/// A transport error is forwarded as an `Err` and ends parsing.
///
/// # Arguments
///
/// * `byte_stream` - The raw HTTP response body as a stream of byte chunks
/// * `events_tx` - Channel receiving complete data payloads
pub async fn parse_sse_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    events_tx: mpsc::UnboundedSender<Result<String>>,
) {
    use futures::StreamExt;

    let mut buffer: Vec<u8> = Vec::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Gemini stream interrupted: {}", e);
                let _ = events_tx.send(Err(StudymateError::Provider(format!(
                    "Gemini stream interrupted: {}",
                    e
                ))
                .into()));
                return;
            }
        };

        buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        while let Some(pos) = buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = buffer.drain(..pos + 2).collect();
            forward_sse_event(&block[..pos], &events_tx);
        }
    }

    if !buffer.is_empty() {
        forward_sse_event(&buffer, &events_tx);
    }
}

fn forward_sse_event(block: &[u8], events_tx: &mpsc::UnboundedSender<Result<String>>) {
    let text = String::from_utf8_lossy(block);
    let data = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    // Comments, keep-alives and field-only events carry no payload.
    if data.is_empty() {
        return;
    }

    let _ = events_tx.send(Ok(data));
}
