//! # API Module
//!
//! The remote text-generation call: one prompt in, one free-text answer out.
//!
//! [`TextGenerator`] is the seam the search loop is written against.
//! [`OpenAiGenerator`] implements it over any OpenAI-compatible chat-completions
//! endpoint (Gemini's OpenAI-compatible endpoint by default).
//!
//! Failures are split into [`GenerationError::InvalidCredential`], which aborts a
//! search run, and everything else, which only loses the one car's answer.
//!
//! # Example
//!
//! ```no_run
//! use carspec::api::{OpenAiGenerator, TextGenerator};
//! use carspec::config::CarSpecConfig;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CarSpecConfig::default();
//! let generator = OpenAiGenerator::new(&config, config.api_key()?, None)?;
//! let answer = generator.generate("What is the cargo volume of a Honda Fit?").await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

use crate::config::CarSpecConfig;
use async_openai::{
    config::{Config, OpenAIConfig},
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
};
use reqwest::StatusCode;
use std::{error::Error, future::Future};
use tracing::debug;

/// Phrases providers use when rejecting a key.
const INVALID_KEY_MARKERS: [&str; 4] = [
    "API key not valid",
    "invalid_api_key",
    "Incorrect API key",
    "Invalid API Key",
];

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The provider rejected the API key. Fatal for a search run.
    #[error("Invalid API key: {0}. Check the API key in your .env file.")]
    InvalidCredential(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response contained no text")]
    EmptyResponse,
}

impl GenerationError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, GenerationError::InvalidCredential(_))
    }

    /// Classify a non-success response from its status and raw body text.
    /// Error bodies are not parsed; Gemini's arrive as a JSON array.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let rejected_key = status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || INVALID_KEY_MARKERS.iter().any(|marker| body.contains(marker));

        if rejected_key {
            GenerationError::InvalidCredential(format!("{status}: {}", body.trim()))
        } else {
            GenerationError::Request(format!("{status}: {}", body.trim()))
        }
    }
}

impl From<OpenAIError> for GenerationError {
    fn from(err: OpenAIError) -> Self {
        GenerationError::Request(err.to_string())
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

/// Something that answers a prompt with free text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerationError>>;
}

/// [`TextGenerator`] backed by an OpenAI-compatible chat-completions API.
///
/// Requests are built with async-openai's types and sent through `reqwest`
/// directly, so the status and body of a failed call are both available.
pub struct OpenAiGenerator {
    config: OpenAIConfig,
    http_client: reqwest::Client,
    model: String,
    system_prompt: Option<String>,
}

impl OpenAiGenerator {
    /// Build a client for `config.api_base` / `config.model`.
    pub fn new(
        config: &CarSpecConfig,
        api_key: String,
        system_prompt: Option<String>,
    ) -> Result<Self, Box<dyn Error>> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.api_base.clone());
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        debug!("Client created for {} ({})", config.api_base, config.model);

        Ok(OpenAiGenerator {
            config: openai_config,
            http_client,
            model: config.model.clone(),
            system_prompt,
        })
    }

    fn build_messages(
        &self,
        prompt: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt.as_str())
                    .build()?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        );
        Ok(messages)
    }
}

impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(self.build_messages(prompt)?)
            .build()?;

        debug!("Sending request: {:?}", request);
        let response = self
            .http_client
            .post(self.config.url("/chat/completions"))
            .headers(self.config.headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::from_response(status, &body));
        }

        let completion: CreateChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Request(format!("unreadable response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
