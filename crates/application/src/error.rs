//! Application-level errors

use std::path::PathBuf;

use ai_speech::SpeechError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Speech layer error (configuration, audio, device)
    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// SSML input could not be read
    #[error("Failed to read SSML from {}: {source}", path.display())]
    SsmlRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Synthesized audio could not be written
    #[error("Failed to write audio to {}: {source}", path.display())]
    AudioWrite {
        /// Path that was written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Console output failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}
