//! Relay core library — config, Slack webhook ingestion, inference forwarding,
//! and reply posting. Used by the `relay` CLI binary.

pub mod config;
pub mod inference;
pub mod relay;
pub mod slack;
