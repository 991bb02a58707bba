// error.rs - Error Types
// Startup errors end the process, per-event errors are only logged.

use thiserror::Error;

/// Errors raised while assembling the bot configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No Discord token provided. Bot can't be authenticated.")]
    MissingDiscordToken,
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from a single provider lookup
#[derive(Debug, Error)]
pub enum GifError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No results found for query: '{0}'")]
    NoResults(String),
}

/// Errors while posting a reply back to the channel
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Failed to send message: {0}")]
    Send(#[from] serenity::Error),
}
