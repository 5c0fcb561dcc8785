//! Types for speech processing
//!
//! Contains output format selectors, audio containers, recognition and
//! synthesis results, and the detailed recognition payload.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpeechError;

/// Shape of the recognition payload returned by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionOutputFormat {
    /// Top-level `DisplayText` only
    Simple,
    /// `NBest` alternatives with confidence scores
    #[default]
    Detailed,
}

impl RecognitionOutputFormat {
    /// Value of the `format` query parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for RecognitionOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecognitionOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            _ => Err(format!(
                "Invalid recognition format: {s}. Use 'simple' or 'detailed'"
            )),
        }
    }
}

/// Audio encodings the synthesis endpoint can produce
///
/// Serialized as the value of the `X-Microsoft-OutputFormat` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynthesisOutputFormat {
    /// Headerless 16 kHz 16-bit mono PCM
    #[serde(rename = "raw-16khz-16bit-mono-pcm")]
    Raw16Khz16BitMonoPcm,
    /// Headerless 24 kHz 16-bit mono PCM
    #[serde(rename = "raw-24khz-16bit-mono-pcm")]
    Raw24Khz16BitMonoPcm,
    /// 16 kHz 16-bit mono PCM in a RIFF/WAV container
    #[serde(rename = "riff-16khz-16bit-mono-pcm")]
    Riff16Khz16BitMonoPcm,
    /// 24 kHz 16-bit mono PCM in a RIFF/WAV container
    #[serde(rename = "riff-24khz-16bit-mono-pcm")]
    Riff24Khz16BitMonoPcm,
    /// 16 kHz mono MP3 at 32 kbit/s
    #[serde(rename = "audio-16khz-32kbitrate-mono-mp3")]
    Audio16Khz32KBitRateMonoMp3,
    /// 16 kHz mono MP3 at 128 kbit/s
    #[serde(rename = "audio-16khz-128kbitrate-mono-mp3")]
    Audio16Khz128KBitRateMonoMp3,
    /// 24 kHz mono MP3 at 48 kbit/s
    #[serde(rename = "audio-24khz-48kbitrate-mono-mp3")]
    Audio24Khz48KBitRateMonoMp3,
    /// 16 kHz mono Opus in an OGG container
    #[serde(rename = "ogg-16khz-16bit-mono-opus")]
    Ogg16Khz16BitMonoOpus,
    /// 16 kHz mono Opus in a WebM container
    #[serde(rename = "webm-16khz-16bit-mono-opus")]
    Webm16Khz16BitMonoOpus,
}

/// How PCM samples are packaged in a synthesis response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmContainer {
    /// Bare little-endian samples
    Raw,
    /// RIFF/WAV file
    Riff,
}

impl SynthesisOutputFormat {
    /// All supported formats
    pub const ALL: [Self; 9] = [
        Self::Raw16Khz16BitMonoPcm,
        Self::Raw24Khz16BitMonoPcm,
        Self::Riff16Khz16BitMonoPcm,
        Self::Riff24Khz16BitMonoPcm,
        Self::Audio16Khz32KBitRateMonoMp3,
        Self::Audio16Khz128KBitRateMonoMp3,
        Self::Audio24Khz48KBitRateMonoMp3,
        Self::Ogg16Khz16BitMonoOpus,
        Self::Webm16Khz16BitMonoOpus,
    ];

    /// Value of the `X-Microsoft-OutputFormat` header
    #[must_use]
    pub const fn header_value(&self) -> &'static str {
        match self {
            Self::Raw16Khz16BitMonoPcm => "raw-16khz-16bit-mono-pcm",
            Self::Raw24Khz16BitMonoPcm => "raw-24khz-16bit-mono-pcm",
            Self::Riff16Khz16BitMonoPcm => "riff-16khz-16bit-mono-pcm",
            Self::Riff24Khz16BitMonoPcm => "riff-24khz-16bit-mono-pcm",
            Self::Audio16Khz32KBitRateMonoMp3 => "audio-16khz-32kbitrate-mono-mp3",
            Self::Audio16Khz128KBitRateMonoMp3 => "audio-16khz-128kbitrate-mono-mp3",
            Self::Audio24Khz48KBitRateMonoMp3 => "audio-24khz-48kbitrate-mono-mp3",
            Self::Ogg16Khz16BitMonoOpus => "ogg-16khz-16bit-mono-opus",
            Self::Webm16Khz16BitMonoOpus => "webm-16khz-16bit-mono-opus",
        }
    }

    /// Conventional file extension for this encoding
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Raw16Khz16BitMonoPcm | Self::Raw24Khz16BitMonoPcm => "pcm",
            Self::Riff16Khz16BitMonoPcm | Self::Riff24Khz16BitMonoPcm => "wav",
            Self::Audio16Khz32KBitRateMonoMp3
            | Self::Audio16Khz128KBitRateMonoMp3
            | Self::Audio24Khz48KBitRateMonoMp3 => "mp3",
            Self::Ogg16Khz16BitMonoOpus => "ogg",
            Self::Webm16Khz16BitMonoOpus => "webm",
        }
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        match self {
            Self::Raw24Khz16BitMonoPcm
            | Self::Riff24Khz16BitMonoPcm
            | Self::Audio24Khz48KBitRateMonoMp3 => 24_000,
            _ => 16_000,
        }
    }

    /// PCM packaging, or `None` for compressed encodings
    #[must_use]
    pub const fn pcm_container(&self) -> Option<PcmContainer> {
        match self {
            Self::Raw16Khz16BitMonoPcm | Self::Raw24Khz16BitMonoPcm => Some(PcmContainer::Raw),
            Self::Riff16Khz16BitMonoPcm | Self::Riff24Khz16BitMonoPcm => {
                Some(PcmContainer::Riff)
            },
            _ => None,
        }
    }
}

impl fmt::Display for SynthesisOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value())
    }
}

impl FromStr for SynthesisOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.header_value() == wanted)
            .ok_or_else(|| format!("Unsupported synthesis output format: {s}"))
    }
}

/// Synthesized audio with its encoding
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Vec<u8>,
    format: SynthesisOutputFormat,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub const fn new(data: Vec<u8>, format: SynthesisOutputFormat) -> Self {
        Self { data, format }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the audio encoding
    #[must_use]
    pub const fn format(&self) -> SynthesisOutputFormat {
        self.format
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Mono 16-bit PCM samples at a known rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    /// Interleaved mono samples
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl PcmBuffer {
    /// Create a new buffer
    #[must_use]
    pub const fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(self.sample_rate)
    }

    /// Check if the buffer holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Where synthesized audio goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutputConfig {
    /// The default output device
    DefaultSpeaker,
    /// An audio file at the given path
    File(PathBuf),
}

/// Outcome status of a recognition or synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultReason {
    /// Speech was recognized
    RecognizedSpeech,
    /// Audio was received but nothing could be recognized
    NoMatch,
    /// Synthesis finished and audio is available
    SynthesizingAudioCompleted,
    /// The call failed; see the cancellation details
    Canceled,
}

impl fmt::Display for ResultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RecognizedSpeech => "RecognizedSpeech",
            Self::NoMatch => "NoMatch",
            Self::SynthesizingAudioCompleted => "SynthesizingAudioCompleted",
            Self::Canceled => "Canceled",
        };
        write!(f, "ResultReason.{name}")
    }
}

/// Why a recognition produced no match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoMatchReason {
    /// Speech was detected but not recognized
    NotRecognized,
    /// Only silence before the timeout
    InitialSilenceTimeout,
    /// Only noise before the timeout
    InitialBabbleTimeout,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecognized => write!(f, "speech was not recognized"),
            Self::InitialSilenceTimeout => write!(f, "only silence was heard"),
            Self::InitialBabbleTimeout => write!(f, "only noise was heard"),
        }
    }
}

/// Error classification attached to a canceled result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancellationErrorCode {
    /// Credential rejected (HTTP 401/403)
    AuthenticationFailure,
    /// Request rejected, e.g. malformed SSML (HTTP 400)
    BadRequest,
    /// Quota or rate limit exceeded (HTTP 429)
    TooManyRequests,
    /// Service could not be reached
    ConnectionFailure,
    /// Service did not answer in time
    ServiceTimeout,
    /// Service-side failure or unusable response
    ServiceError,
}

impl CancellationErrorCode {
    /// Classify an HTTP status code returned by the service
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 | 403 => Self::AuthenticationFailure,
            408 => Self::ServiceTimeout,
            429 => Self::TooManyRequests,
            _ => Self::ServiceError,
        }
    }
}

impl fmt::Display for CancellationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AuthenticationFailure => "AuthenticationFailure",
            Self::BadRequest => "BadRequest",
            Self::TooManyRequests => "TooManyRequests",
            Self::ConnectionFailure => "ConnectionFailure",
            Self::ServiceTimeout => "ServiceTimeout",
            Self::ServiceError => "ServiceError",
        };
        f.write_str(name)
    }
}

/// Details of a canceled call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationDetails {
    /// Error classification
    pub error_code: CancellationErrorCode,
    /// Human-readable details from the service or transport
    pub error_details: String,
}

impl CancellationDetails {
    /// Create cancellation details
    #[must_use]
    pub fn new(error_code: CancellationErrorCode, error_details: impl Into<String>) -> Self {
        Self {
            error_code,
            error_details: error_details.into(),
        }
    }
}

impl fmt::Display for CancellationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code, self.error_details)
    }
}

/// Result of a single recognition call
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Outcome status
    pub reason: ResultReason,
    /// Recognized text (on success)
    pub text: Option<String>,
    /// Raw JSON payload returned by the service
    pub json: Option<String>,
    /// Why nothing matched (on no-match)
    pub no_match_reason: Option<NoMatchReason>,
    /// Why the call failed (on cancel)
    pub cancellation: Option<CancellationDetails>,
}

impl RecognitionResult {
    /// Successful recognition
    #[must_use]
    pub fn recognized(text: impl Into<String>, json: Option<String>) -> Self {
        Self {
            reason: ResultReason::RecognizedSpeech,
            text: Some(text.into()),
            json,
            no_match_reason: None,
            cancellation: None,
        }
    }

    /// Nothing recognizable in the audio
    #[must_use]
    pub const fn no_match(reason: NoMatchReason, json: Option<String>) -> Self {
        Self {
            reason: ResultReason::NoMatch,
            text: None,
            json,
            no_match_reason: Some(reason),
            cancellation: None,
        }
    }

    /// Failed recognition
    #[must_use]
    pub const fn canceled(details: CancellationDetails) -> Self {
        Self {
            reason: ResultReason::Canceled,
            text: None,
            json: None,
            no_match_reason: None,
            cancellation: Some(details),
        }
    }
}

/// Result of a single synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Outcome status
    pub reason: ResultReason,
    /// Synthesized audio (on completion)
    pub audio: Option<AudioData>,
    /// Why the call failed (on cancel)
    pub cancellation: Option<CancellationDetails>,
}

impl SynthesisResult {
    /// Completed synthesis
    #[must_use]
    pub const fn completed(audio: AudioData) -> Self {
        Self {
            reason: ResultReason::SynthesizingAudioCompleted,
            audio: Some(audio),
            cancellation: None,
        }
    }

    /// Failed synthesis
    #[must_use]
    pub const fn canceled(details: CancellationDetails) -> Self {
        Self {
            reason: ResultReason::Canceled,
            audio: None,
            cancellation: Some(details),
        }
    }
}

/// One hypothesis from the `NBest` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Recognizer certainty
    #[serde(rename = "Confidence")]
    pub confidence: f64,
    /// Raw lexical form
    #[serde(rename = "Lexical", default)]
    pub lexical: String,
    /// Inverse-text-normalized form
    #[serde(rename = "ITN", default)]
    pub itn: String,
    /// ITN form with profanity masked
    #[serde(rename = "MaskedITN", default)]
    pub masked_itn: String,
    /// Display form with punctuation and capitalization
    #[serde(rename = "Display")]
    pub display: String,
}

/// JSON payload of a recognition response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionPayload {
    /// `Success`, `NoMatch`, `InitialSilenceTimeout`, `BabbleTimeout` or `Error`
    #[serde(rename = "RecognitionStatus")]
    pub recognition_status: String,
    /// Best transcription (simple format)
    #[serde(rename = "DisplayText", default)]
    pub display_text: Option<String>,
    /// Start of speech in 100ns ticks
    #[serde(rename = "Offset", default)]
    pub offset: Option<u64>,
    /// Length of speech in 100ns ticks
    #[serde(rename = "Duration", default)]
    pub duration: Option<u64>,
    /// Ranked alternatives (detailed format)
    #[serde(rename = "NBest", default)]
    pub nbest: Option<Vec<Alternative>>,
}

impl RecognitionPayload {
    /// Parse a recognition payload
    pub fn from_json(json: &str) -> Result<Self, SpeechError> {
        serde_json::from_str(json).map_err(|e| {
            SpeechError::InvalidResponse(format!("Failed to parse recognition payload: {e}"))
        })
    }

    /// Best display text: `DisplayText`, falling back to the first alternative
    #[must_use]
    pub fn best_text(&self) -> Option<&str> {
        self.display_text.as_deref().or_else(|| {
            self.nbest
                .as_ref()
                .and_then(|alternatives| alternatives.first())
                .map(|alternative| alternative.display.as_str())
        })
    }
}

/// Information about an available synthesis voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Identifier used in SSML, e.g. `en-US-DavisNeural`
    #[serde(rename = "ShortName")]
    pub short_name: String,
    /// Human-readable name
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    /// Locale, e.g. `en-US`
    #[serde(rename = "Locale", default)]
    pub locale: String,
    /// `Male`, `Female` or `Neutral`
    #[serde(rename = "Gender", default)]
    pub gender: String,
}
