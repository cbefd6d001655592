//! Slack Events API payloads (url_verification handshake and event_callback).

use serde::Deserialize;

/// Outer envelope of a POST to the events endpoint.
#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    /// "url_verification" or "event_callback"; anything else is acknowledged and ignored.
    #[serde(rename = "type")]
    pub typ: String,

    /// Present on url_verification payloads; echoed back to Slack.
    #[serde(default)]
    pub challenge: Option<String>,

    /// Present on event_callback payloads.
    #[serde(default)]
    pub event: Option<MessageEvent>,
}

/// Inner event of an event_callback envelope. All fields are optional so
/// non-message event types (reaction_added, app_mention, ...) still
/// deserialize; only "message" events with text and channel are dispatched.
#[derive(Debug, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default)]
    pub typ: String,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub channel: Option<String>,

    /// Set when the message was produced by a bot (including this one).
    /// Such messages are never forwarded, so the bot cannot reply to itself.
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_verification() {
        let raw = r#"{"type":"url_verification","challenge":"ch4ll3ng3","token":"ignored"}"#;
        let env: EventEnvelope = serde_json::from_str(raw).expect("parse envelope");
        assert_eq!(env.typ, "url_verification");
        assert_eq!(env.challenge.as_deref(), Some("ch4ll3ng3"));
        assert!(env.event.is_none());
    }

    #[test]
    fn parse_message_event() {
        let raw = r#"{
            "type": "event_callback",
            "event": { "type": "message", "text": "hello", "channel": "C1", "user": "U1" }
        }"#;
        let env: EventEnvelope = serde_json::from_str(raw).expect("parse envelope");
        assert_eq!(env.typ, "event_callback");
        let event = env.event.expect("message event");
        assert_eq!(event.typ, "message");
        assert_eq!(event.text.as_deref(), Some("hello"));
        assert_eq!(event.channel.as_deref(), Some("C1"));
        assert!(event.bot_id.is_none());
    }

    #[test]
    fn parse_bot_message_event() {
        let raw = r#"{
            "type": "event_callback",
            "event": { "type": "message", "text": "echo", "channel": "C1", "bot_id": "B123" }
        }"#;
        let env: EventEnvelope = serde_json::from_str(raw).expect("parse envelope");
        assert_eq!(env.event.expect("event").bot_id.as_deref(), Some("B123"));
    }

    #[test]
    fn parse_non_message_event() {
        let raw = r#"{
            "type": "event_callback",
            "event": { "type": "reaction_added", "reaction": "thumbsup" }
        }"#;
        let env: EventEnvelope = serde_json::from_str(raw).expect("parse envelope");
        let event = env.event.expect("event");
        assert_eq!(event.typ, "reaction_added");
        assert!(event.text.is_none());
    }

    #[test]
    fn missing_type_fails() {
        assert!(serde_json::from_str::<EventEnvelope>(r#"{"challenge":"c"}"#).is_err());
    }
}
