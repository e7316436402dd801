//! OpenAI-compatible chat-completions transport.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::transport::{CompletionRequest, ModelTransport, TransportError};

/// Longest error body kept in a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 512;

pub struct HttpTransport {
    endpoint: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// `endpoint` is the full chat-completions URL.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("crisiswatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            http_client,
        })
    }

    fn body(request: &CompletionRequest) -> Value {
        json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.prompt}
            ]
        })
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, TransportError> {
        debug!(model = %request.model, endpoint = %self.endpoint, "posting completion request");
        let mut builder = self.http_client.post(&self.endpoint).json(&Self::body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TransportError::Status {
                model: request.model.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or(TransportError::EmptyResponse)
    }
}
