//! HTTP chat-completions implementation of the Summarization Service.
//!
//! # Responsibility
//! - Talk to an OpenAI-style `chat/completions` endpoint over blocking
//!   HTTP.
//! - Map transport, status and decode failures into the uniform
//!   `AiServiceError`.
//!
//! # Invariants
//! - One request per capability call; no retry.
//! - The configured timeout bounds every request.

use super::{AiResult, AiServiceError, SummaryProvider};
use crate::model::note::TAG_MAX_CHARS;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ENV_ENDPOINT: &str = "NOTEWISE_AI_ENDPOINT";
const ENV_API_KEY: &str = "NOTEWISE_AI_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that creates clear, \
concise summaries of text content. Focus on extracting the most important information \
and presenting it in an organized manner.";
const TITLE_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates concise, \
descriptive titles for text content.";
const TAGS_SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts relevant \
tags from text content. Return only the tags separated by commas.";

/// Endpoint settings for [`ChatCompletionProvider`].
#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    /// Full URL of the `chat/completions` endpoint.
    pub endpoint: String,
    /// Optional bearer token sent as `Authorization: Bearer ...`.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ChatCompletionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads endpoint and key from `NOTEWISE_AI_ENDPOINT` /
    /// `NOTEWISE_AI_API_KEY`. Fails when the endpoint is unset.
    pub fn from_env() -> Result<Self, AiServiceError> {
        let endpoint = std::env::var(ENV_ENDPOINT)
            .map_err(|_| AiServiceError::new(format!("{ENV_ENDPOINT} is not set")))?;
        Ok(Self {
            endpoint,
            api_key: std::env::var(ENV_API_KEY).ok(),
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

/// Blocking chat-completions client for OpenAI-compatible endpoints.
pub struct ChatCompletionProvider {
    config: ChatCompletionConfig,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl ChatCompletionProvider {
    pub fn new(config: ChatCompletionConfig) -> Result<Self, AiServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AiServiceError::new(format!("http client setup failed: {err}")))?;
        Ok(Self { config, client })
    }

    fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> AiResult<String> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature: 0.3,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = self.config.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|err| {
            warn!("event=ai_request module=ai status=error error={err}");
            AiServiceError::new(format!("request failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("event=ai_request module=ai status=error http_status={status}");
            return Err(AiServiceError::new(format!("endpoint returned {status}")));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|err| AiServiceError::new(format!("response decode failed: {err}")))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiServiceError::new("response carried no choices"))?;

        Ok(content.trim().to_string())
    }
}

impl SummaryProvider for ChatCompletionProvider {
    fn summarize(&self, content: &str, model_id: &str) -> AiResult<String> {
        let prompt = format!(
            "Please provide a concise and well-structured summary of the following text. \
             Focus on the key points and main ideas. Keep the summary clear and easy to \
             understand.\n\nText to summarize:\n{content}\n\nPlease provide a summary that \
             is approximately 20-30% of the original length."
        );
        self.complete(model_id, SUMMARY_SYSTEM_PROMPT, &prompt, 500)
    }

    fn generate_title(&self, content: &str) -> AiResult<String> {
        let prompt = format!(
            "Generate a concise and descriptive title (maximum 60 characters) for the \
             following text:\n\n{content}\n\nTitle:"
        );
        self.complete(
            crate::model::note::DEFAULT_AI_MODEL,
            TITLE_SYSTEM_PROMPT,
            &prompt,
            20,
        )
    }

    fn extract_tags(&self, content: &str) -> AiResult<Vec<String>> {
        let prompt = format!(
            "Extract 3-5 relevant tags from the following text. Return only the tags \
             separated by commas, no additional text:\n\n{content}"
        );
        let raw = self.complete(
            crate::model::note::DEFAULT_AI_MODEL,
            TAGS_SYSTEM_PROMPT,
            &prompt,
            50,
        )?;

        let tags = raw
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty() && tag.chars().count() <= TAG_MAX_CHARS)
            .collect();
        Ok(tags)
    }
}
