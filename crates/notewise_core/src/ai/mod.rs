//! Summarization Service boundary.
//!
//! # Responsibility
//! - Define the provider contract consumed by the enrichment pipeline.
//! - Keep model-call mechanics opaque behind one trait object.
//!
//! # Invariants
//! - Provider failures are uniform: callers never inspect subtypes.
//! - Calls block until completion; retry/timeout policy beyond a single
//!   request belongs to the caller.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod http;

pub use http::{ChatCompletionConfig, ChatCompletionProvider};

pub type AiResult<T> = Result<T, AiServiceError>;

/// Uniform, opaque Summarization Service failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiServiceError {
    message: String,
}

impl AiServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for AiServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "summarization service failure: {}", self.message)
    }
}

impl Error for AiServiceError {}

/// Capabilities of the external Summarization Service.
///
/// Injected into the enrichment pipeline at construction time so tests
/// can substitute a scripted fake; core never holds a process-wide
/// client singleton.
pub trait SummaryProvider: Send + Sync {
    /// Produces a prose summary of `content` using the given model.
    fn summarize(&self, content: &str, model_id: &str) -> AiResult<String>;
    /// Produces a short descriptive title for `content`.
    fn generate_title(&self, content: &str) -> AiResult<String>;
    /// Extracts 3-5 relevant tags from `content`.
    fn extract_tags(&self, content: &str) -> AiResult<Vec<String>>;
}
