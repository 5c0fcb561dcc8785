//! Speech processing errors
//!
//! Service-side failures of a recognition or synthesis call are reported as a
//! `Canceled` result, not as an error. `SpeechError` covers local problems
//! (configuration, audio data, devices) and calls that have no result type.

use thiserror::Error;

/// Errors that can occur during speech processing
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Invalid audio format or corrupted data
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Invalid response from service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during processing
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Audio input or output device failure
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// Capability not available in this build or on this host
    #[error("Not available: {0}")]
    NotAvailable(String),
}

impl SpeechError {
    /// Map a transport error, using the configured timeout for the message
    pub(crate) fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
