//! OpenAI-compatible chat-completions provider
//!
//! Used for text generation and for multimodal transcription, where the audio
//! is sent inline as a base64 data URL.

use super::error_for_response;
use crate::audio::AudioClip;
use crate::backend::{GenerateOptions, LlmProvider, Prompt};
use crate::error::BackendError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use evai_common::config::ProviderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const TRANSCRIBE_INSTRUCTION: &str = "Transcribe the following audio accurately. \
Output ONLY the verbatim transcript with no commentary and no punctuation correction. \
Preserve all hesitations (um, uh, repeated words).";

/// Chat-completions client (OpenRouter by default)
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    transcription_model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatProvider {
    pub fn new(config: &ProviderConfig) -> evai_common::Result<Self> {
        // Attempt timeouts are enforced by the backend client; this one only
        // stops a stuck connection from outliving it
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.saturating_mul(2)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| evai_common::Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            transcription_model: config.transcription_model.clone(),
            temperature: config.temperature,
        })
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<String, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("HTTP-Referer", "https://eduvision.app")
            .header("X-Title", "EduVision AI")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::upstream(format!("malformed completion: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| BackendError::upstream("completion contained no content"))
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn complete(
        &self,
        prompt: &Prompt,
        options: &GenerateOptions,
    ) -> Result<String, BackendError> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(json!({ "role": "system", "content": prompt.system }));
        }
        messages.push(json!({ "role": "user", "content": prompt.user }));

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: options.temperature.unwrap_or(self.temperature),
            response_format: options
                .json_output
                .then(|| json!({ "type": "json_object" })),
        };
        self.chat(&request).await
    }

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, BackendError> {
        let data_url = format!(
            "data:{};base64,{}",
            audio.mime_type,
            BASE64.encode(&audio.bytes)
        );
        let request = ChatRequest {
            model: &self.transcription_model,
            messages: vec![json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": TRANSCRIBE_INSTRUCTION },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            })],
            temperature: 0.0,
            response_format: None,
        };

        let transcript = self.chat(&request).await?;
        tracing::debug!(
            transcript_chars = transcript.chars().count(),
            "Transcription received"
        );
        Ok(transcript)
    }
}
