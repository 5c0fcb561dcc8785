//! Configuration for speech processing
//!
//! Every pipeline builds its [`SpeechConfig`] through [`build_speech_config`]
//! from an explicit [`SpeechOptions`] value. The resulting config is
//! immutable.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::SpeechError;
use crate::types::{RecognitionOutputFormat, SynthesisOutputFormat};

/// Locale used when none is configured
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Voice used when plain text is wrapped into SSML
pub const DEFAULT_VOICE: &str = "en-US-DavisNeural";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Inputs for [`build_speech_config`]
#[derive(Clone)]
pub struct SpeechOptions {
    /// Subscription key of the speech resource
    pub subscription_key: SecretString,
    /// Region of the speech resource, e.g. `northeurope`
    pub region: String,
    /// Shape of recognition payloads
    pub recognition_format: RecognitionOutputFormat,
    /// Audio encoding for synthesis, `None` to let each target pick its own
    pub synthesis_format: Option<SynthesisOutputFormat>,
    /// Recognition locale and SSML `xml:lang`
    pub language: String,
    /// Voice for text wrapped into SSML
    pub voice: String,
    /// HTTP request timeout in milliseconds
    pub timeout_ms: u64,
    /// Override for the recognition base URL
    pub stt_endpoint: Option<String>,
    /// Override for the synthesis base URL
    pub tts_endpoint: Option<String>,
}

impl SpeechOptions {
    /// Options with defaults for everything but the credential and region
    #[must_use]
    pub fn new(subscription_key: SecretString, region: impl Into<String>) -> Self {
        Self {
            subscription_key,
            region: region.into(),
            recognition_format: RecognitionOutputFormat::default(),
            synthesis_format: None,
            language: DEFAULT_LANGUAGE.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            stt_endpoint: None,
            tts_endpoint: None,
        }
    }
}

impl fmt::Debug for SpeechOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechOptions")
            .field("subscription_key", &"[REDACTED]")
            .field("region", &self.region)
            .field("recognition_format", &self.recognition_format)
            .field("synthesis_format", &self.synthesis_format)
            .field("language", &self.language)
            .field("voice", &self.voice)
            .field("timeout_ms", &self.timeout_ms)
            .field("stt_endpoint", &self.stt_endpoint)
            .field("tts_endpoint", &self.tts_endpoint)
            .finish()
    }
}

/// Validated, immutable speech configuration
#[derive(Clone)]
pub struct SpeechConfig {
    subscription_key: SecretString,
    region: String,
    recognition_format: RecognitionOutputFormat,
    synthesis_format: Option<SynthesisOutputFormat>,
    language: String,
    voice: String,
    timeout_ms: u64,
    stt_base_url: String,
    tts_base_url: String,
}

/// Build the speech configuration shared by all pipelines
///
/// # Errors
///
/// Returns `SpeechError::Configuration` if the key or region is blank, the
/// timeout is zero, or an endpoint override is not an http(s) URL.
pub fn build_speech_config(options: SpeechOptions) -> Result<SpeechConfig, SpeechError> {
    if options.subscription_key.expose_secret().trim().is_empty() {
        return Err(SpeechError::Configuration(
            "subscription key is required".to_string(),
        ));
    }

    let region = options.region.trim().to_lowercase();
    if region.is_empty() {
        return Err(SpeechError::Configuration("region is required".to_string()));
    }
    if !region.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SpeechError::Configuration(format!(
            "region must be alphanumeric, got '{region}'"
        )));
    }

    if options.timeout_ms == 0 {
        return Err(SpeechError::Configuration(
            "timeout must be greater than 0".to_string(),
        ));
    }

    if options.language.trim().is_empty() {
        return Err(SpeechError::Configuration(
            "language must not be empty".to_string(),
        ));
    }

    let stt_base_url = resolve_endpoint(options.stt_endpoint, &region, "stt")?;
    let tts_base_url = resolve_endpoint(options.tts_endpoint, &region, "tts")?;

    Ok(SpeechConfig {
        subscription_key: options.subscription_key,
        region,
        recognition_format: options.recognition_format,
        synthesis_format: options.synthesis_format,
        language: options.language,
        voice: options.voice,
        timeout_ms: options.timeout_ms,
        stt_base_url,
        tts_base_url,
    })
}

fn resolve_endpoint(
    endpoint: Option<String>,
    region: &str,
    service: &str,
) -> Result<String, SpeechError> {
    match endpoint {
        Some(url) => {
            let url = url.trim().trim_end_matches('/').to_string();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url)
            } else {
                Err(SpeechError::Configuration(format!(
                    "{service} endpoint must be an http(s) URL, got '{url}'"
                )))
            }
        },
        None => Ok(format!("https://{region}.{service}.speech.microsoft.com")),
    }
}

impl SpeechConfig {
    /// Subscription key, for request headers only
    pub(crate) fn subscription_key(&self) -> &str {
        self.subscription_key.expose_secret()
    }

    /// Region of the speech resource
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Shape of recognition payloads
    #[must_use]
    pub const fn recognition_format(&self) -> RecognitionOutputFormat {
        self.recognition_format
    }

    /// Configured synthesis encoding, if any
    #[must_use]
    pub const fn synthesis_format(&self) -> Option<SynthesisOutputFormat> {
        self.synthesis_format
    }

    /// Recognition locale
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Default synthesis voice
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Request timeout in milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Base URL of the recognition service
    #[must_use]
    pub fn stt_base_url(&self) -> &str {
        &self.stt_base_url
    }

    /// Base URL of the synthesis service
    #[must_use]
    pub fn tts_base_url(&self) -> &str {
        &self.tts_base_url
    }

    /// Create a config for tests pointing both services at one base URL
    #[cfg(test)]
    pub fn test(base_url: &str) -> Self {
        let mut options = SpeechOptions::new(SecretString::from("test-key"), "westeurope");
        options.stt_endpoint = Some(base_url.to_string());
        options.tts_endpoint = Some(base_url.to_string());
        match build_speech_config(options) {
            Ok(config) => config,
            Err(e) => unreachable!("test config is valid: {e}"),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("subscription_key", &"[REDACTED]")
            .field("region", &self.region)
            .field("recognition_format", &self.recognition_format)
            .field("synthesis_format", &self.synthesis_format)
            .field("language", &self.language)
            .field("voice", &self.voice)
            .field("timeout_ms", &self.timeout_ms)
            .field("stt_base_url", &self.stt_base_url)
            .field("tts_base_url", &self.tts_base_url)
            .finish()
    }
}
