//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.relay/config.json`) and environment.
//! Environment variables override file values for secrets and endpoints.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Slack credentials and API endpoint.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Inference endpoint settings.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Server bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the events webhook and liveness probe (default 3000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; Slack must be able to reach the endpoint).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Slack settings: signing secret for inbound verification, bot token for posting replies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// App signing secret used to verify inbound event requests. Overridden by SLACK_SIGNING_SECRET env.
    pub signing_secret: Option<String>,

    /// Bot OAuth token (xoxb-...). Overridden by SLACK_BOT_TOKEN env.
    pub bot_token: Option<String>,

    /// Slack Web API base URL. Leave unset for https://slack.com; set only for tests or a proxy.
    pub api_base_url: Option<String>,
}

/// Inference endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Full URL the forwarder POSTs messages to. Overridden by INFERENCE_API_URL env.
    pub endpoint: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| non_empty(&s))
}

/// Resolve the Slack signing secret: env SLACK_SIGNING_SECRET overrides config.
pub fn resolve_signing_secret(config: &Config) -> Option<String> {
    env_value("SLACK_SIGNING_SECRET")
        .or_else(|| config.slack.signing_secret.as_deref().and_then(non_empty))
}

/// Resolve the Slack bot token: env SLACK_BOT_TOKEN overrides config.
pub fn resolve_bot_token(config: &Config) -> Option<String> {
    env_value("SLACK_BOT_TOKEN").or_else(|| config.slack.bot_token.as_deref().and_then(non_empty))
}

/// Resolve the inference endpoint URL: env INFERENCE_API_URL overrides config.
pub fn resolve_inference_endpoint(config: &Config) -> Option<String> {
    env_value("INFERENCE_API_URL")
        .or_else(|| config.inference.endpoint.as_deref().and_then(non_empty))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".relay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or RELAY_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_port_and_bind() {
        let s = ServerConfig::default();
        assert_eq!(s.port, 3000);
        assert_eq!(s.bind, "0.0.0.0");
    }

    #[test]
    fn parse_config_json() {
        let raw = r#"{
            "server": { "port": 8080, "bind": "127.0.0.1" },
            "slack": { "signingSecret": "s3cr3t", "botToken": "xoxb-1" },
            "inference": { "endpoint": "http://localhost:9000/chat" }
        }"#;
        let config: Config = serde_json::from_str(raw).expect("parse config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.slack.signing_secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.slack.bot_token.as_deref(), Some("xoxb-1"));
        assert_eq!(
            config.inference.endpoint.as_deref(),
            Some("http://localhost:9000/chat")
        );
    }

    #[test]
    fn empty_sections_use_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse config");
        assert_eq!(config.server.port, 3000);
        assert!(config.slack.signing_secret.is_none());
        assert!(config.inference.endpoint.is_none());
    }

    #[test]
    fn blank_values_are_filtered() {
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty(" xoxb-2 ").as_deref(), Some("xoxb-2"));
    }
}
