//! Speech service settings

use ai_speech::config::{DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_MS, DEFAULT_VOICE};
use ai_speech::{RecognitionOutputFormat, SpeechError, SpeechOptions, SynthesisOutputFormat};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `[speech]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechAppConfig {
    /// Subscription key of the speech resource (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub subscription_key: Option<SecretString>,

    /// Region of the speech resource
    #[serde(default)]
    pub region: Option<String>,

    /// Recognition locale and SSML language
    #[serde(default = "default_language")]
    pub language: String,

    /// Voice for text wrapped into SSML
    #[serde(default = "default_voice")]
    pub voice: String,

    /// `simple` or `detailed`
    #[serde(default)]
    pub recognition_format: RecognitionOutputFormat,

    /// Synthesis encoding; each target has its own default when unset
    #[serde(default)]
    pub synthesis_format: Option<SynthesisOutputFormat>,

    /// HTTP request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Override for the recognition base URL
    #[serde(default)]
    pub stt_endpoint: Option<String>,

    /// Override for the synthesis base URL
    #[serde(default)]
    pub tts_endpoint: Option<String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for SpeechAppConfig {
    fn default() -> Self {
        Self {
            subscription_key: None,
            region: None,
            language: default_language(),
            voice: default_voice(),
            recognition_format: RecognitionOutputFormat::default(),
            synthesis_format: None,
            timeout_ms: default_timeout_ms(),
            stt_endpoint: None,
            tts_endpoint: None,
        }
    }
}

impl SpeechAppConfig {
    /// Apply credentials given on the command line
    ///
    /// Blank values are ignored so an empty environment variable does not
    /// shadow the config file.
    pub fn apply_overrides(&mut self, key: Option<String>, region: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            debug!("Subscription key taken from the command line");
            self.subscription_key = Some(SecretString::from(key));
        }
        if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
            debug!(%region, "Region taken from the command line");
            self.region = Some(region);
        }
    }

    /// Options for `ai_speech::build_speech_config`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the key or region is missing.
    pub fn speech_options(&self) -> Result<SpeechOptions, SpeechError> {
        let key = self.subscription_key.clone().ok_or_else(|| {
            SpeechError::Configuration(
                "subscription key is not set (use --key, SPEECH_KEY or speech.subscription_key)"
                    .to_string(),
            )
        })?;
        let region = self.region.clone().ok_or_else(|| {
            SpeechError::Configuration(
                "region is not set (use --region, SPEECH_REGION or speech.region)".to_string(),
            )
        })?;

        let mut options = SpeechOptions::new(key, region);
        options.recognition_format = self.recognition_format;
        options.synthesis_format = self.synthesis_format;
        options.language.clone_from(&self.language);
        options.voice.clone_from(&self.voice);
        options.timeout_ms = self.timeout_ms;
        options.stt_endpoint.clone_from(&self.stt_endpoint);
        options.tts_endpoint.clone_from(&self.tts_endpoint);
        Ok(options)
    }
}
