//! Relay HTTP server: Slack events webhook in, inference call out,
//! chat.postMessage back to the originating channel.
//!
//! The webhook handler acknowledges Slack before any downstream work runs:
//! verified message events are pushed onto an in-process queue and a single
//! processor task drains it, awaiting the forward and the reply post in
//! sequence per event.

use crate::config::{self, Config};
use crate::inference::InferenceClient;
use crate::slack::{signature, ChatPoster, EventEnvelope, SlackClient};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::mpsc;

/// A verified user message queued for forwarding.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel: String,
    pub text: String,
}

/// Shared state for the relay handlers.
#[derive(Clone)]
pub struct RelayState {
    /// Verifies X-Slack-Signature on every events POST.
    pub signing_secret: String,
    /// Sender for verified message events; the processor task receives.
    pub inbound_tx: mpsc::Sender<InboundMessage>,
}

/// Build the relay router (events webhook + liveness probe).
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .route("/test", get(test_probe))
        .with_state(state)
}

/// Process one inbound message: forward the text to the inference API, post
/// the reply back to the channel. Posting failures are logged and dropped;
/// the webhook response was already sent.
async fn process_inbound(inference: &InferenceClient, poster: &dyn ChatPoster, msg: InboundMessage) {
    let reply = inference.forward(&msg.text).await;
    if let Err(e) = poster.post_message(&msg.channel, &reply).await {
        log::warn!("posting reply to {} failed: {}", msg.channel, e);
    }
}

/// Run the relay server; binds to config.server.bind:config.server.port.
/// Startup fails when no signing secret is configured, since inbound events
/// could not be verified. A missing bot token only degrades posting.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_relay(config: Config) -> Result<()> {
    let signing_secret = config::resolve_signing_secret(&config).context(
        "no Slack signing secret configured (set SLACK_SIGNING_SECRET or slack.signingSecret)",
    )?;

    let bot_token = config::resolve_bot_token(&config);
    if bot_token.is_none() {
        log::warn!("no Slack bot token configured; replies will not be posted");
    }
    let endpoint = config::resolve_inference_endpoint(&config);
    if endpoint.is_none() {
        log::info!("no inference endpoint configured, using the default local endpoint");
    }
    let slack = SlackClient::new(bot_token, config.slack.api_base_url.clone());
    let inference = InferenceClient::new(endpoint);

    let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundMessage>(64);
    tokio::spawn(async move {
        while let Some(msg) = inbound_rx.recv().await {
            process_inbound(&inference, &slack, msg).await;
        }
    });

    let state = RelayState {
        signing_secret,
        inbound_tx,
    };

    let app = router(state);
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("relay listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// POST /slack/events — verifies the request signature, answers
/// url_verification, queues message events, acknowledges everything else.
async fn slack_events(State(state): State<RelayState>, headers: HeaderMap, body: Bytes) -> Response {
    let timestamp = headers
        .get("X-Slack-Request-Timestamp")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let provided = headers
        .get("X-Slack-Signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let now = chrono::Utc::now().timestamp();
    if !signature::verify(&state.signing_secret, timestamp, &body, provided, now) {
        log::debug!("rejected events POST with bad or stale signature");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    if envelope.typ == "url_verification" {
        let challenge = envelope.challenge.unwrap_or_default();
        return Json(json!({ "challenge": challenge })).into_response();
    }
    if envelope.typ != "event_callback" {
        return StatusCode::OK.into_response();
    }
    let Some(event) = envelope.event else {
        return StatusCode::OK.into_response();
    };
    if event.typ != "message" || event.bot_id.is_some() {
        return StatusCode::OK.into_response();
    }
    let (Some(text), Some(channel)) = (event.text, event.channel) else {
        return StatusCode::OK.into_response();
    };
    let inbound = InboundMessage { channel, text };
    if state.inbound_tx.send(inbound).await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    StatusCode::OK.into_response()
}

/// GET /test — liveness probe.
async fn test_probe() -> &'static str {
    "Server is running"
}
