//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{
    AudioData, PcmBuffer, RecognitionResult, SynthesisOutputFormat, SynthesisResult, VoiceInfo,
};

/// Port for single-shot speech recognition
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechRecognizer, PcmBuffer, ResultReason};
///
/// async fn transcript(stt: &impl SpeechRecognizer, audio: PcmBuffer) -> Option<String> {
///     let result = stt.recognize_once(audio).await.ok()?;
///     (result.reason == ResultReason::RecognizedSpeech).then(|| result.text).flatten()
/// }
/// ```
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize one utterance
    ///
    /// Resolves once the service has returned a terminal status. Service and
    /// transport failures come back as a `Canceled` result.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the audio cannot be submitted at all.
    async fn recognize_once(&self, audio: PcmBuffer) -> Result<RecognitionResult, SpeechError>;
}

/// Port for SSML speech synthesis
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize an SSML document
    ///
    /// The SSML is submitted as-is. Malformed markup surfaces as a
    /// `Canceled` result.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the request cannot be built.
    async fn synthesize_ssml(
        &self,
        ssml: &str,
        format: SynthesisOutputFormat,
    ) -> Result<SynthesisResult, SpeechError>;

    /// List voices offered in the configured region
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if listing fails.
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError>;
}

/// Port for capturing one utterance of audio
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Line shown to the user before capture starts
    fn prompt(&self) -> String;

    /// Capture audio until the utterance ends
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the device or file cannot be read.
    async fn capture(&self) -> Result<PcmBuffer, SpeechError>;
}

/// Port for playing synthesized audio
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Check that an output device can be opened
    ///
    /// Called before synthesis so an unusable speaker fails without a
    /// service round trip.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::NotAvailable` or `SpeechError::AudioDevice` if
    /// playback cannot happen on this host.
    fn check_available(&self) -> Result<(), SpeechError>;

    /// Play the audio and resolve when playback has finished
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the encoding cannot be played or the device
    /// fails.
    async fn play(&self, audio: &AudioData) -> Result<(), SpeechError>;
}
