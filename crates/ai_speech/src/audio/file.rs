//! WAV file audio source

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::wav;
use crate::error::SpeechError;
use crate::ports::AudioSource;
use crate::types::PcmBuffer;

/// Reads a prerecorded utterance from a 16-bit PCM WAV file
#[derive(Debug, Clone)]
pub struct WavFileSource {
    path: PathBuf,
}

impl WavFileSource {
    /// Create a source for the given file
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the WAV file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AudioSource for WavFileSource {
    fn prompt(&self) -> String {
        format!("🎧 Recognizing speech from {}...", self.path.display())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn capture(&self) -> Result<PcmBuffer, SpeechError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            SpeechError::InvalidAudio(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        let pcm = wav::decode(&bytes)?;
        debug!(
            samples = pcm.samples.len(),
            sample_rate = pcm.sample_rate,
            "Loaded WAV file"
        );
        Ok(pcm)
    }
}
