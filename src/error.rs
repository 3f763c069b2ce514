//! Error taxonomy for the API client.
//!
//! Transport failures (no response), authorization failures (401), and
//! API-level failures (4xx/5xx or `success: false` envelopes) are kept
//! distinct so the session layer can react to each one; everything carries a
//! human-readable message for the UI.

use thiserror::Error;

/// Fallback text when the server gives no usable message.
pub const GENERIC_ERROR: &str = "Something went wrong, please try again";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered 401; the stored token has already been cleared.
    #[error("unauthorized")]
    Unauthorized,

    /// The server answered with a failure status or a `success: false`
    /// envelope. `message` is the server's text, or a generic fallback.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected envelope shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Unauthorized => "Session expired, please log in again".to_string(),
            Self::Transport(_) | Self::Decode(_) => GENERIC_ERROR.to_string(),
        }
    }
}
