//! Azure Speech provider
//!
//! Implements `SpeechRecognizer` against the short-audio recognition REST
//! endpoint and `SpeechSynthesizer` against the SSML synthesis endpoint.
//!
//! Service and transport failures of a recognition or synthesis call are
//! folded into a `Canceled` result carrying [`CancellationDetails`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::audio::{RECOGNITION_SAMPLE_RATE, resample_linear, wav};
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechRecognizer, SpeechSynthesizer};
use crate::types::{
    AudioData, CancellationDetails, CancellationErrorCode, NoMatchReason, PcmBuffer,
    RecognitionPayload, RecognitionResult, SynthesisOutputFormat, SynthesisResult, VoiceInfo,
};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const RECOGNITION_CONTENT_TYPE: &str = "audio/wav; codecs=audio/pcm; samplerate=16000";
const SSML_CONTENT_TYPE: &str = "application/ssml+xml";
const USER_AGENT: &str = "speechlab";

/// Longest service error body kept in cancellation details
const MAX_DETAILS_LEN: usize = 512;

/// Azure speech provider implementing both recognition and synthesis
#[derive(Debug, Clone)]
pub struct AzureSpeechProvider {
    client: Client,
    config: SpeechConfig,
}

impl AzureSpeechProvider {
    /// Create a new Azure speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Configuration the provider was built with
    #[must_use]
    pub const fn config(&self) -> &SpeechConfig {
        &self.config
    }

    fn stt_url(&self) -> String {
        format!(
            "{}/speech/recognition/conversation/cognitiveservices/v1",
            self.config.stt_base_url()
        )
    }

    fn tts_url(&self) -> String {
        format!("{}/cognitiveservices/v1", self.config.tts_base_url())
    }

    fn voices_url(&self) -> String {
        format!("{}/cognitiveservices/voices/list", self.config.tts_base_url())
    }

    /// Map a recognition payload onto a result
    fn interpret(json: String) -> RecognitionResult {
        let payload = match RecognitionPayload::from_json(&json) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Unparseable recognition response");
                return RecognitionResult::canceled(CancellationDetails::new(
                    CancellationErrorCode::ServiceError,
                    e.to_string(),
                ));
            },
        };

        match payload.recognition_status.as_str() {
            "Success" => match payload.best_text() {
                Some(text) => {
                    let text = text.to_string();
                    RecognitionResult::recognized(text, Some(json))
                },
                None => RecognitionResult::no_match(NoMatchReason::NotRecognized, Some(json)),
            },
            "NoMatch" => RecognitionResult::no_match(NoMatchReason::NotRecognized, Some(json)),
            "InitialSilenceTimeout" => {
                RecognitionResult::no_match(NoMatchReason::InitialSilenceTimeout, Some(json))
            },
            "BabbleTimeout" => {
                RecognitionResult::no_match(NoMatchReason::InitialBabbleTimeout, Some(json))
            },
            other => RecognitionResult::canceled(CancellationDetails::new(
                CancellationErrorCode::ServiceError,
                format!("recognition status {other}"),
            )),
        }
    }
}

/// Cancellation details for a transport failure
fn transport_cancellation(err: &reqwest::Error) -> CancellationDetails {
    let code = if err.is_timeout() {
        CancellationErrorCode::ServiceTimeout
    } else if err.is_connect() {
        CancellationErrorCode::ConnectionFailure
    } else {
        CancellationErrorCode::ServiceError
    };
    CancellationDetails::new(code, err.to_string())
}

/// Cancellation details for a non-success HTTP status
fn http_cancellation(status: StatusCode, body: &str) -> CancellationDetails {
    let code = CancellationErrorCode::from_http_status(status.as_u16());
    let body = body.trim();
    let details = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        let body: String = body.chars().take(MAX_DETAILS_LEN).collect();
        format!("HTTP {status}: {body}")
    };
    CancellationDetails::new(code, details)
}

#[async_trait]
impl SpeechRecognizer for AzureSpeechProvider {
    #[instrument(
        skip(self, audio),
        fields(duration_ms = audio.duration_ms(), language = %self.config.language())
    )]
    async fn recognize_once(&self, audio: PcmBuffer) -> Result<RecognitionResult, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("no samples captured".to_string()));
        }

        let samples = resample_linear(&audio.samples, audio.sample_rate, RECOGNITION_SAMPLE_RATE);
        let body = wav::encode(&PcmBuffer::new(samples, RECOGNITION_SAMPLE_RATE));
        debug!(body_bytes = body.len(), "Submitting utterance for recognition");

        let response = match self
            .client
            .post(self.stt_url())
            .query(&[
                ("language", self.config.language()),
                ("format", self.config.recognition_format().as_str()),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, self.config.subscription_key())
            .header(reqwest::header::CONTENT_TYPE, RECOGNITION_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Recognition request failed");
                return Ok(RecognitionResult::canceled(transport_cancellation(&e)));
            },
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Ok(RecognitionResult::canceled(transport_cancellation(&e))),
        };

        if !status.is_success() {
            warn!(%status, "Recognition rejected by service");
            return Ok(RecognitionResult::canceled(http_cancellation(status, &text)));
        }

        let result = Self::interpret(text);
        debug!(reason = %result.reason, "Recognition complete");
        Ok(result)
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSpeechProvider {
    #[instrument(skip(self, ssml), fields(ssml_len = ssml.len(), format = %format))]
    async fn synthesize_ssml(
        &self,
        ssml: &str,
        format: SynthesisOutputFormat,
    ) -> Result<SynthesisResult, SpeechError> {
        debug!("Synthesizing SSML");

        let response = match self
            .client
            .post(self.tts_url())
            .header(SUBSCRIPTION_KEY_HEADER, self.config.subscription_key())
            .header(reqwest::header::CONTENT_TYPE, SSML_CONTENT_TYPE)
            .header(OUTPUT_FORMAT_HEADER, format.header_value())
            .body(ssml.to_string())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Synthesis request failed");
                return Ok(SynthesisResult::canceled(transport_cancellation(&e)));
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Synthesis rejected by service");
            return Ok(SynthesisResult::canceled(http_cancellation(status, &body)));
        }

        let audio: Bytes = match response.bytes().await {
            Ok(audio) => audio,
            Err(e) => return Ok(SynthesisResult::canceled(transport_cancellation(&e))),
        };

        if audio.is_empty() {
            return Ok(SynthesisResult::canceled(CancellationDetails::new(
                CancellationErrorCode::ServiceError,
                "service returned no audio",
            )));
        }

        debug!(audio_bytes = audio.len(), "Synthesis complete");
        Ok(SynthesisResult::completed(AudioData::new(
            audio.to_vec(),
            format,
        )))
    }

    #[instrument(skip(self))]
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        let timeout_ms = self.config.timeout_ms();
        let response = self
            .client
            .get(self.voices_url())
            .header(SUBSCRIPTION_KEY_HEADER, self.config.subscription_key())
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::RequestFailed(
                http_cancellation(status, &body).error_details,
            ));
        }

        let voices: Vec<VoiceInfo> = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse voice list: {e}")))?;

        debug!(count = voices.len(), "Listed voices");
        Ok(voices)
    }
}
