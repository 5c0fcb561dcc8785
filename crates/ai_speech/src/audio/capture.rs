//! Microphone capture

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::CaptureSettings;
use crate::error::SpeechError;
use crate::ports::AudioSource;
use crate::types::PcmBuffer;

/// Captures one utterance from the default input device
#[derive(Debug, Clone, Default)]
pub struct MicrophoneSource {
    settings: CaptureSettings,
}

impl MicrophoneSource {
    /// Create a microphone source
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the capture settings are invalid.
    pub fn new(settings: CaptureSettings) -> Result<Self, SpeechError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Capture settings in use
    #[must_use]
    pub const fn settings(&self) -> &CaptureSettings {
        &self.settings
    }
}

#[async_trait]
impl AudioSource for MicrophoneSource {
    fn prompt(&self) -> String {
        "🎙️ Speak into your microphone...".to_string()
    }

    #[instrument(skip(self), fields(max_ms = self.settings.max_duration_ms))]
    async fn capture(&self) -> Result<PcmBuffer, SpeechError> {
        let settings = self.settings;
        let pcm = tokio::task::spawn_blocking(move || device::record(&settings))
            .await
            .map_err(|e| SpeechError::AudioDevice(format!("capture task failed: {e}")))??;

        debug!(
            duration_ms = pcm.duration_ms(),
            sample_rate = pcm.sample_rate,
            "Microphone capture complete"
        );
        Ok(pcm)
    }
}

#[cfg(feature = "audio-device")]
mod device {
    use std::sync::mpsc;
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, Sample, SampleFormat, SizedSample};
    use tracing::{debug, error};

    use crate::audio::{CaptureSettings, CaptureState, UtteranceDetector, downmix, f32_to_i16};
    use crate::error::SpeechError;
    use crate::types::PcmBuffer;

    /// Longest gap between callbacks before the stream is considered dead
    const STALL_TIMEOUT: Duration = Duration::from_secs(2);

    pub(super) fn record(settings: &CaptureSettings) -> Result<PcmBuffer, SpeechError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| SpeechError::AudioDevice("no default input device".to_string()))?;
        let supported = device
            .default_input_config()
            .map_err(|e| SpeechError::AudioDevice(e.to_string()))?;

        let sample_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels());
        let config = supported.config();
        let (tx, rx) = mpsc::channel::<Vec<f32>>();

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build::<f32>(&device, &config, channels, tx)?,
            SampleFormat::I16 => build::<i16>(&device, &config, channels, tx)?,
            SampleFormat::U16 => build::<u16>(&device, &config, channels, tx)?,
            other => {
                return Err(SpeechError::AudioDevice(format!(
                    "unsupported input sample format {other:?}"
                )));
            },
        };
        stream
            .play()
            .map_err(|e| SpeechError::AudioDevice(e.to_string()))?;

        let mut detector = UtteranceDetector::new(settings, sample_rate);
        let mut captured: Vec<f32> = Vec::new();
        let end = loop {
            let block = rx
                .recv_timeout(STALL_TIMEOUT)
                .map_err(|_| SpeechError::AudioDevice("input stream stalled".to_string()))?;
            captured.extend_from_slice(&block);
            if let CaptureState::Finished(end) = detector.push(&block) {
                break end;
            }
        };
        drop(stream);

        debug!(?end, samples = captured.len(), "Capture ended");
        Ok(PcmBuffer::new(
            captured.into_iter().map(f32_to_i16).collect(),
            sample_rate,
        ))
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        channels: usize,
        tx: mpsc::Sender<Vec<f32>>,
    ) -> Result<cpal::Stream, SpeechError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    let block: Vec<f32> = data.iter().map(|s| s.to_sample::<f32>()).collect();
                    // Receiver is gone once capture has finished
                    let _ = tx.send(downmix(&block, channels));
                },
                |err| error!("capture stream error: {}", err),
                None,
            )
            .map_err(|e| SpeechError::AudioDevice(e.to_string()))
    }
}

#[cfg(not(feature = "audio-device"))]
mod device {
    use crate::audio::CaptureSettings;
    use crate::error::SpeechError;
    use crate::types::PcmBuffer;

    pub(super) fn record(_settings: &CaptureSettings) -> Result<PcmBuffer, SpeechError> {
        Err(SpeechError::NotAvailable(
            "microphone capture (built without the audio-device feature)".to_string(),
        ))
    }
}
