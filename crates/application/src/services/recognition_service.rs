//! Recognition service - One utterance in, recognized text and alternatives out

use std::{fmt, io::Write, sync::Arc};

use ai_speech::{AudioSource, NoMatchReason, RecognitionResult, SpeechRecognizer};
use tracing::{debug, info, instrument};

use super::report;
use crate::error::ApplicationError;

/// Service running the recognition pipeline
pub struct RecognitionService {
    recognizer: Arc<dyn SpeechRecognizer>,
    source: Arc<dyn AudioSource>,
}

impl fmt::Debug for RecognitionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionService").finish_non_exhaustive()
    }
}

impl RecognitionService {
    /// Create a new recognition service
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, source: Arc<dyn AudioSource>) -> Self {
        Self { recognizer, source }
    }

    /// Capture one utterance, recognize it and print the outcome
    ///
    /// No-match and canceled results are printed and returned; they are not
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError` if audio capture fails or the console
    /// cannot be written.
    #[instrument(skip(self, out))]
    pub async fn run(&self, out: &mut impl Write) -> Result<RecognitionResult, ApplicationError> {
        writeln!(out, "{}", self.source.prompt())?;
        out.flush()?;

        let audio = self.source.capture().await?;
        debug!(duration_ms = audio.duration_ms(), "Audio captured");

        let result = if audio.is_empty() {
            RecognitionResult::no_match(NoMatchReason::InitialSilenceTimeout, None)
        } else {
            self.recognizer.recognize_once(audio).await?
        };

        info!(reason = %result.reason, "Recognition finished");
        report::write_recognition(out, &result)?;
        Ok(result)
    }
}
