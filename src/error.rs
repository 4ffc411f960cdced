//! Error types for Kesher core

use thiserror::Error;

/// Errors raised by the state containers, snapshots and configuration
#[derive(Debug, Error)]
pub enum KesherError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Unknown training scenario: {0}")]
    UnknownScenario(u32),
}

/// Failures of the chat completion collaborator.
///
/// None of these reach the user: the chat session swaps in its fallback reply.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Missing API key for chat completions")]
    MissingCredential,

    #[error("Chat endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Chat transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Chat reply had no content")]
    EmptyReply,
}
