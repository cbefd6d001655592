//! Inference API client: forwards a user message and returns the reply text.

use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

/// Reply used whenever the inference call fails, so the responder always
/// receives a usable string.
pub const FALLBACK_REPLY: &str = "Sorry, there was an error processing your request.";

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("inference api error: {0}")]
    Api(String),
}

#[derive(Debug, Serialize)]
struct ForwardRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForwardResponse {
    response: String,
}

/// Client for the remote inference endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    endpoint: String,
    client: reqwest::Client,
}

impl InferenceClient {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    /// POST {"message": ...} to the endpoint and return the reply's `response` field.
    pub async fn chat(&self, message: &str) -> Result<String, InferenceError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(&ForwardRequest { message })
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(InferenceError::Api(format!("{} {}", status, body)));
        }
        let data: ForwardResponse = res.json().await?;
        Ok(data.response)
    }

    /// chat() with failures normalized to FALLBACK_REPLY. Network errors,
    /// non-2xx statuses, and malformed bodies all collapse to the same
    /// fallback; callers never see an error from this path.
    pub async fn forward(&self, message: &str) -> String {
        match self.chat(message).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("inference call failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
