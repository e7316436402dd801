//! Black-box text completion seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Failure of a single completion call. Never escapes the orchestrator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(String),

    #[error("model {model} returned status {status}: {body}")]
    Status {
        model: String,
        status: u16,
        body: String,
    },

    #[error("response carried no completion text")]
    EmptyResponse,

    #[error("transport not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

/// Injectable completion backend.
///
/// Implement this for a hosted model API, or use a scripted fake in tests.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, TransportError>;
}
