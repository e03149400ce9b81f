// Typed errors with thiserror. None of these are fatal to a tracker; the lifecycle logs and drops.
// See DESIGN.md: Error Handling

use thiserror::Error;

/// Tracker error types.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed {channel} message: {payload}")]
    MalformedMessage {
        channel: &'static str,
        payload: String,
    },

    #[error("Unknown video status: {0}")]
    UnknownVideoStatus(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}
