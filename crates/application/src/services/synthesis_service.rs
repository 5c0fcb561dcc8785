//! Synthesis service - SSML to speaker or audio file
//!
//! The synthesis call is dispatched and awaited before anything is played or
//! written, so a command never finishes ahead of its terminal status.

use std::{fmt, io::Write, path::PathBuf, sync::Arc};

use ai_speech::{
    AudioOutputConfig, AudioPlayer, ResultReason, SpeechSynthesizer, SynthesisOutputFormat,
    SynthesisResult, ssml,
};
use tracing::{debug, info, instrument, warn};

use super::report;
use crate::error::ApplicationError;

/// Where the SSML document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsmlSource {
    /// Read an SSML file as-is
    File(PathBuf),
    /// Wrap plain text in a single-voice document
    Text {
        /// Text to speak
        text: String,
        /// Voice name
        voice: String,
        /// Document language
        language: String,
    },
}

impl SsmlSource {
    /// Produce the SSML document
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::SsmlRead` if the file cannot be read.
    pub async fn load(&self) -> Result<String, ApplicationError> {
        match self {
            Self::File(path) => tokio::fs::read_to_string(path).await.map_err(|source| {
                ApplicationError::SsmlRead {
                    path: path.clone(),
                    source,
                }
            }),
            Self::Text {
                text,
                voice,
                language,
            } => Ok(ssml::wrap_text(text, voice, language)),
        }
    }
}

/// Encoding used for a target when none is configured
#[must_use]
pub const fn default_format_for(target: &AudioOutputConfig) -> SynthesisOutputFormat {
    match target {
        AudioOutputConfig::DefaultSpeaker => SynthesisOutputFormat::Raw16Khz16BitMonoPcm,
        AudioOutputConfig::File(_) => SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3,
    }
}

/// Whether the target can take audio in this encoding
#[must_use]
pub const fn format_fits(target: &AudioOutputConfig, format: SynthesisOutputFormat) -> bool {
    match target {
        AudioOutputConfig::DefaultSpeaker => format.pcm_container().is_some(),
        AudioOutputConfig::File(_) => true,
    }
}

/// Pick the encoding for a target
///
/// An explicitly requested encoding wins. The configured one applies only
/// when it fits the target, otherwise the target default is used.
#[must_use]
pub fn resolve_format(
    target: &AudioOutputConfig,
    requested: Option<SynthesisOutputFormat>,
    configured: Option<SynthesisOutputFormat>,
) -> SynthesisOutputFormat {
    if let Some(format) = requested {
        return format;
    }
    match configured {
        Some(format) if format_fits(target, format) => format,
        Some(format) => {
            let fallback = default_format_for(target);
            debug!(configured = %format, %fallback, "Configured format does not fit the target");
            fallback
        },
        None => default_format_for(target),
    }
}

/// Service running the synthesis pipelines
pub struct SynthesisService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
}

impl fmt::Debug for SynthesisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisService").finish_non_exhaustive()
    }
}

impl SynthesisService {
    /// Create a new synthesis service
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            synthesizer,
            player,
        }
    }

    /// Synthesize an SSML document to the target and print the outcome
    ///
    /// On completion the audio is played or written to the file. A canceled
    /// result is printed and returned, and no file is created.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError` if the format cannot be played on the
    /// speaker, no speaker is available, playback fails, the file cannot be
    /// written, or the console cannot be written.
    #[instrument(skip(self, ssml, out), fields(ssml_len = ssml.len(), format = %format))]
    pub async fn run(
        &self,
        ssml: &str,
        target: &AudioOutputConfig,
        format: SynthesisOutputFormat,
        out: &mut impl Write,
    ) -> Result<SynthesisResult, ApplicationError> {
        if !format_fits(target, format) {
            return Err(ApplicationError::Configuration(format!(
                "speaker output needs a PCM format, got {format}"
            )));
        }
        if *target == AudioOutputConfig::DefaultSpeaker {
            self.player.check_available()?;
        }

        if let AudioOutputConfig::File(path) = target {
            let extension = path.extension().and_then(|e| e.to_str());
            if extension != Some(format.extension()) {
                warn!(
                    path = %path.display(),
                    expected = format.extension(),
                    "Output file extension does not match the audio format"
                );
            }
        }

        let result = self.synthesizer.synthesize_ssml(ssml, format).await?;
        info!(reason = %result.reason, "Synthesis finished");

        if result.reason == ResultReason::SynthesizingAudioCompleted {
            if let Some(audio) = &result.audio {
                match target {
                    AudioOutputConfig::DefaultSpeaker => self.player.play(audio).await?,
                    AudioOutputConfig::File(path) => {
                        tokio::fs::write(path, audio.data()).await.map_err(|source| {
                            ApplicationError::AudioWrite {
                                path: path.clone(),
                                source,
                            }
                        })?;
                        debug!(path = %path.display(), bytes = audio.size_bytes(), "Audio written");
                    },
                }
            }
        }

        report::write_synthesis(out, &result, target)?;
        Ok(result)
    }

    /// Load the SSML and run the pipeline
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::SsmlRead` if the SSML cannot be loaded, and
    /// any error from [`Self::run`].
    pub async fn run_from(
        &self,
        source: &SsmlSource,
        target: &AudioOutputConfig,
        format: SynthesisOutputFormat,
        out: &mut impl Write,
    ) -> Result<SynthesisResult, ApplicationError> {
        let ssml = source.load().await?;
        self.run(&ssml, target, format, out).await
    }
}

#[cfg(test)]
mod tests {
    use ai_speech::{AudioData, CancellationDetails, CancellationErrorCode, SpeechError};

    use super::*;
    use crate::services::mocks::{MockPlayer, MockSynthesizer};

    const SSML: &str = r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="en-US"><voice name="en-US-DavisNeural">Hello.</voice></speak>"#;

    fn completing_synthesizer() -> MockSynthesizer {
        let mut synthesizer = MockSynthesizer::new();
        synthesizer
            .expect_synthesize_ssml()
            .times(1)
            .returning(|_, format| {
                Ok(SynthesisResult::completed(AudioData::new(
                    vec![0xFF, 0xFB, 0x90, 0x00],
                    format,
                )))
            });
        synthesizer
    }

    fn failing_synthesizer() -> MockSynthesizer {
        let mut synthesizer = MockSynthesizer::new();
        synthesizer.expect_synthesize_ssml().returning(|_, _| {
            Ok(SynthesisResult::canceled(CancellationDetails::new(
                CancellationErrorCode::BadRequest,
                "HTTP 400 Bad Request",
            )))
        });
        synthesizer
    }

    fn idle_player() -> MockPlayer {
        let mut player = MockPlayer::new();
        player.expect_check_available().returning(|| Ok(()));
        player.expect_play().never();
        player
    }

    fn ready_player() -> MockPlayer {
        let mut player = MockPlayer::new();
        player.expect_check_available().times(1).returning(|| Ok(()));
        player
    }

    #[tokio::test]
    async fn speaker_success_plays_and_prints_exact_line() {
        let mut player = ready_player();
        player.expect_play().times(1).returning(|_| Ok(()));
        let service = SynthesisService::new(Arc::new(completing_synthesizer()), Arc::new(player));

        let mut out = Vec::new();
        let result = service
            .run(
                SSML,
                &AudioOutputConfig::DefaultSpeaker,
                SynthesisOutputFormat::Raw16Khz16BitMonoPcm,
                &mut out,
            )
            .await
            .unwrap();

        assert_eq!(result.reason, ResultReason::SynthesizingAudioCompleted);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ Speech synthesized successfully.\n"
        );
    }

    #[tokio::test]
    async fn file_success_writes_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.mp3");
        let target = AudioOutputConfig::File(path.clone());
        let service =
            SynthesisService::new(Arc::new(completing_synthesizer()), Arc::new(idle_player()));

        let mut out = Vec::new();
        service
            .run(SSML, &target, default_format_for(&target), &mut out)
            .await
            .unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("✅ Speech synthesized successfully: {}\n", path.display())
        );
    }

    #[tokio::test]
    async fn file_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.mp3");
        let target = AudioOutputConfig::File(path.clone());
        let service =
            SynthesisService::new(Arc::new(failing_synthesizer()), Arc::new(idle_player()));

        let mut out = Vec::new();
        let result = service
            .run(SSML, &target, default_format_for(&target), &mut out)
            .await
            .unwrap();

        assert_eq!(result.reason, ResultReason::Canceled);
        assert!(!path.exists());
        assert!(
            String::from_utf8(out)
                .unwrap()
                .starts_with("⚠️ Speech synthesis failed: ResultReason.Canceled")
        );
    }

    #[tokio::test]
    async fn speaker_failure_returns_normally() {
        let service =
            SynthesisService::new(Arc::new(failing_synthesizer()), Arc::new(idle_player()));

        let mut out = Vec::new();
        let result = service
            .run(
                SSML,
                &AudioOutputConfig::DefaultSpeaker,
                SynthesisOutputFormat::Raw16Khz16BitMonoPcm,
                &mut out,
            )
            .await;

        assert!(result.is_ok());
        assert!(String::from_utf8(out).unwrap().contains("BadRequest"));
    }

    #[tokio::test]
    async fn speaker_rejects_compressed_format_before_calling_service() {
        let mut synthesizer = MockSynthesizer::new();
        synthesizer.expect_synthesize_ssml().never();
        let service = SynthesisService::new(Arc::new(synthesizer), Arc::new(idle_player()));

        let mut out = Vec::new();
        let err = service
            .run(
                SSML,
                &AudioOutputConfig::DefaultSpeaker,
                SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3,
                &mut out,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[tokio::test]
    async fn playback_failure_is_an_error() {
        let mut player = ready_player();
        player
            .expect_play()
            .returning(|_| Err(SpeechError::NotAvailable("speaker playback".into())));
        let service = SynthesisService::new(Arc::new(completing_synthesizer()), Arc::new(player));

        let mut out = Vec::new();
        let err = service
            .run(
                SSML,
                &AudioOutputConfig::DefaultSpeaker,
                SynthesisOutputFormat::Raw16Khz16BitMonoPcm,
                &mut out,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Speech(SpeechError::NotAvailable(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn missing_speaker_fails_before_calling_service() {
        let mut synthesizer = MockSynthesizer::new();
        synthesizer.expect_synthesize_ssml().never();
        let mut player = MockPlayer::new();
        player.expect_check_available().times(1).returning(|| {
            Err(SpeechError::NotAvailable("speaker playback".into()))
        });
        player.expect_play().never();
        let service = SynthesisService::new(Arc::new(synthesizer), Arc::new(player));

        let mut out = Vec::new();
        let err = service
            .run(
                SSML,
                &AudioOutputConfig::DefaultSpeaker,
                SynthesisOutputFormat::Raw16Khz16BitMonoPcm,
                &mut out,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Speech(SpeechError::NotAvailable(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn file_target_skips_speaker_check() {
        let dir = tempfile::tempdir().unwrap();
        let target = AudioOutputConfig::File(dir.path().join("output.mp3"));
        let mut player = MockPlayer::new();
        player.expect_check_available().never();
        player.expect_play().never();
        let service = SynthesisService::new(Arc::new(completing_synthesizer()), Arc::new(player));

        let mut out = Vec::new();
        service
            .run(SSML, &target, default_format_for(&target), &mut out)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn run_from_file_submits_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let ssml_path = dir.path().join("sample.ssml");
        std::fs::write(&ssml_path, SSML).unwrap();

        let mut synthesizer = MockSynthesizer::new();
        synthesizer
            .expect_synthesize_ssml()
            .withf(|ssml, _| ssml == SSML)
            .times(1)
            .returning(|_, format| {
                Ok(SynthesisResult::completed(AudioData::new(vec![1, 0], format)))
            });
        let mut player = ready_player();
        player.expect_play().returning(|_| Ok(()));
        let service = SynthesisService::new(Arc::new(synthesizer), Arc::new(player));

        let mut out = Vec::new();
        service
            .run_from(
                &SsmlSource::File(ssml_path),
                &AudioOutputConfig::DefaultSpeaker,
                SynthesisOutputFormat::Raw16Khz16BitMonoPcm,
                &mut out,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_ssml_file_is_an_error() {
        let source = SsmlSource::File(PathBuf::from("/nonexistent/sample.ssml"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, ApplicationError::SsmlRead { .. }));
    }

    #[tokio::test]
    async fn text_source_is_wrapped() {
        let source = SsmlSource::Text {
            text: "Fish & chips".to_string(),
            voice: "en-US-DavisNeural".to_string(),
            language: "en-US".to_string(),
        };

        let ssml = source.load().await.unwrap();

        assert!(ssml.contains("<voice name=\"en-US-DavisNeural\">Fish &amp; chips</voice>"));
    }

    #[test]
    fn configured_mp3_does_not_reach_the_speaker() {
        let configured = Some(SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3);

        assert_eq!(
            resolve_format(&AudioOutputConfig::DefaultSpeaker, None, configured),
            SynthesisOutputFormat::Raw16Khz16BitMonoPcm
        );
        assert_eq!(
            resolve_format(
                &AudioOutputConfig::File(PathBuf::from("output.mp3")),
                None,
                configured
            ),
            SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3
        );
    }

    #[test]
    fn configured_pcm_applies_to_the_speaker() {
        assert_eq!(
            resolve_format(
                &AudioOutputConfig::DefaultSpeaker,
                None,
                Some(SynthesisOutputFormat::Riff24Khz16BitMonoPcm)
            ),
            SynthesisOutputFormat::Riff24Khz16BitMonoPcm
        );
    }

    #[test]
    fn requested_format_wins() {
        assert_eq!(
            resolve_format(
                &AudioOutputConfig::File(PathBuf::from("output.ogg")),
                Some(SynthesisOutputFormat::Ogg16Khz16BitMonoOpus),
                Some(SynthesisOutputFormat::Audio16Khz128KBitRateMonoMp3)
            ),
            SynthesisOutputFormat::Ogg16Khz16BitMonoOpus
        );
        assert_eq!(
            resolve_format(&AudioOutputConfig::DefaultSpeaker, None, None),
            SynthesisOutputFormat::Raw16Khz16BitMonoPcm
        );
    }

    #[tokio::test]
    async fn configured_mp3_speaker_run_succeeds() {
        let target = AudioOutputConfig::DefaultSpeaker;
        let format = resolve_format(
            &target,
            None,
            Some(SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3),
        );
        let mut player = ready_player();
        player.expect_play().times(1).returning(|_| Ok(()));
        let service = SynthesisService::new(Arc::new(completing_synthesizer()), Arc::new(player));

        let mut out = Vec::new();
        service.run(SSML, &target, format, &mut out).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ Speech synthesized successfully.
"
        );
    }

    #[test]
    fn default_formats_per_target() {
        assert_eq!(
            default_format_for(&AudioOutputConfig::DefaultSpeaker),
            SynthesisOutputFormat::Raw16Khz16BitMonoPcm
        );
        assert_eq!(
            default_format_for(&AudioOutputConfig::File(PathBuf::from("output.mp3"))),
            SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3
        );
    }
}
