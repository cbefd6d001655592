//! Slack Web API client: post replies via chat.postMessage.

use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://slack.com";

/// Anything that can post a message to a channel. The relay depends on this
/// seam rather than on SlackClient directly so tests can record posts.
#[async_trait]
pub trait ChatPoster: Send + Sync {
    /// Post text to a channel. Errors are reported as strings; the caller logs and drops them.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), String>;
}

/// chat.postMessage response body. Slack reports API-level failures with a
/// 200 status and ok: false, so the body must be checked as well.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the Slack Web API.
#[derive(Clone)]
pub struct SlackClient {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl SlackClient {
    pub fn new(token: Option<String>, api_base: Option<String>) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            api_base,
            token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatPoster for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), String> {
        let token = self.token.as_ref().ok_or("slack bot token not configured")?;
        let url = format!("{}/api/chat.postMessage", self.api_base);
        let body = serde_json::json!({ "channel": channel, "text": text });
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("chat.postMessage failed: {} {}", status, body));
        }
        let data: PostMessageResponse = res.json().await.map_err(|e| e.to_string())?;
        if !data.ok {
            return Err(format!(
                "chat.postMessage rejected: {}",
                data.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        Ok(())
    }
}
