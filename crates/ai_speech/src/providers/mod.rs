//! Speech service provider implementations
//!
//! Contains concrete implementations of the `SpeechRecognizer` and
//! `SpeechSynthesizer` traits.

pub mod azure;

pub use azure::AzureSpeechProvider;
