//! AI Speech - Azure speech recognition and synthesis
//!
//! Provides ports and adapters for single-shot speech work:
//! - `SpeechRecognizer` - Recognize one utterance, with `NBest` confidences
//! - `SpeechSynthesizer` - Synthesize an SSML document
//! - `AudioSource` / `AudioPlayer` - Microphone, WAV file and speaker I/O
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` and `audio` modules contain concrete implementations (adapters)
//!
//! Device adapters need the `audio-device` feature, on by default. Without
//! it they report `SpeechError::NotAvailable`.
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{AzureSpeechProvider, SpeechOptions, SpeechSynthesizer, build_speech_config};
//!
//! let config = build_speech_config(SpeechOptions::new(key, "northeurope"))?;
//! let provider = AzureSpeechProvider::new(config)?;
//!
//! let result = provider
//!     .synthesize_ssml(&ssml, SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3)
//!     .await?;
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod ssml;
pub mod types;

pub use audio::{CaptureSettings, MicrophoneSource, SpeakerPlayer, WavFileSource};
pub use config::{SpeechConfig, SpeechOptions, build_speech_config};
pub use error::SpeechError;
pub use ports::{AudioPlayer, AudioSource, SpeechRecognizer, SpeechSynthesizer};
pub use providers::AzureSpeechProvider;
pub use types::{
    Alternative, AudioData, AudioOutputConfig, CancellationDetails, CancellationErrorCode,
    NoMatchReason, PcmBuffer, RecognitionOutputFormat, RecognitionPayload, RecognitionResult,
    ResultReason, SynthesisOutputFormat, SynthesisResult, VoiceInfo,
};
