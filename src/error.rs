/// Error types for the dashboard
use thiserror::Error;

/// Failures while turning a channel message into view updates
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

/// Failures of the telemetry channel itself
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Gave up connecting after {0} attempts")]
    RetriesExhausted(u32),

    #[error("View is no longer receiving channel events")]
    ViewGone,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("{0} is not wired to a device command channel")]
    NotWired(&'static str),
}
