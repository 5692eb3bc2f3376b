use thiserror::Error;

/// Error types for Slack messaging operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid settings, unknown icon type)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A declaratively supplied attribute had the wrong shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Message has neither text, attachments nor blocks
    #[error("Missing text message, attachments or blocks")]
    MissingContent,

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error from Slack
    #[error("Slack API error: {0}")]
    Api(String),
}

impl Error {
    /// Create a new configuration error
    pub fn configuration<S: AsRef<str>>(message: S) -> Self {
        Error::Configuration(message.as_ref().to_string())
    }

    /// Create a new validation error
    pub fn validation<S: AsRef<str>>(message: S) -> Self {
        Error::Validation(message.as_ref().to_string())
    }

    /// Create a new API error
    pub fn api<S: AsRef<str>>(message: S) -> Self {
        Error::Api(message.as_ref().to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
