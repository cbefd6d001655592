//! Slack request signing: HMAC-SHA256 over "v0:{timestamp}:{body}".
//!
//! Every events POST carries X-Slack-Request-Timestamp and X-Slack-Signature;
//! requests that fail verification (or fall outside the freshness window)
//! never reach event dispatch.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version; prefixes both the signed base string and the header value.
const VERSION: &str = "v0";

/// Maximum accepted distance (seconds) between the request timestamp and now.
/// Requests outside this window are rejected to limit replay.
pub const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Compute the signature for a timestamp and raw body: `v0=` + hex HMAC-SHA256 of "v0:{timestamp}:{body}".
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    format!("{}={}", VERSION, hex::encode(mac.finalize().into_bytes()))
}

/// Verify a request signature against the raw body and timestamp header.
/// `now_epoch` is the current unix time; timestamps further than
/// MAX_TIMESTAMP_AGE_SECS from it fail regardless of the signature.
pub fn verify(secret: &str, timestamp: &str, body: &[u8], signature: &str, now_epoch: i64) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };
    if (now_epoch - ts).abs() > MAX_TIMESTAMP_AGE_SECS {
        return false;
    }
    let expected = sign(secret, timestamp, body);
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

// Constant-time comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn sign_and_verify() {
        let ts = NOW.to_string();
        let body = br#"{"type":"event_callback"}"#;
        let sig = sign(SECRET, &ts, body);
        assert!(sig.starts_with("v0="));
        assert!(verify(SECRET, &ts, body, &sig, NOW));
        assert!(!verify("wrong_secret", &ts, body, &sig, NOW));
        assert!(!verify(SECRET, &ts, br#"{"type":"tampered"}"#, &sig, NOW));
    }

    #[test]
    fn stale_timestamp_rejected() {
        let ts = (NOW - MAX_TIMESTAMP_AGE_SECS - 1).to_string();
        let body = b"{}";
        let sig = sign(SECRET, &ts, body);
        assert!(!verify(SECRET, &ts, body, &sig, NOW));
    }

    #[test]
    fn future_timestamp_rejected() {
        let ts = (NOW + MAX_TIMESTAMP_AGE_SECS + 1).to_string();
        let body = b"{}";
        let sig = sign(SECRET, &ts, body);
        assert!(!verify(SECRET, &ts, body, &sig, NOW));
    }

    #[test]
    fn timestamp_at_window_edge_accepted() {
        let ts = (NOW - MAX_TIMESTAMP_AGE_SECS).to_string();
        let body = b"{}";
        let sig = sign(SECRET, &ts, body);
        assert!(verify(SECRET, &ts, body, &sig, NOW));
    }

    #[test]
    fn garbage_timestamp_or_signature_rejected() {
        let body = b"{}";
        let sig = sign(SECRET, "not-a-number", body);
        assert!(!verify(SECRET, "not-a-number", body, &sig, NOW));
        let ts = NOW.to_string();
        assert!(!verify(SECRET, &ts, body, "", NOW));
        assert!(!verify(SECRET, &ts, body, "v0=deadbeef", NOW));
    }
}
