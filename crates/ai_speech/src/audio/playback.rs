//! Speaker playback

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::wav;
use crate::error::SpeechError;
use crate::ports::AudioPlayer;
use crate::types::{AudioData, PcmBuffer, PcmContainer};

/// Plays synthesized PCM audio on the default output device
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerPlayer;

impl SpeakerPlayer {
    /// Create a speaker player
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Decode synthesized audio into mono samples for playback
///
/// # Errors
///
/// Returns `SpeechError::Configuration` for compressed encodings and
/// `SpeechError::InvalidAudio` for malformed RIFF data.
pub fn decode_for_playback(audio: &AudioData) -> Result<PcmBuffer, SpeechError> {
    let format = audio.format();
    match format.pcm_container() {
        Some(PcmContainer::Raw) => Ok(PcmBuffer::new(
            wav::interleaved_to_mono(audio.data(), 1),
            format.sample_rate(),
        )),
        Some(PcmContainer::Riff) => wav::decode(audio.data()),
        None => Err(SpeechError::Configuration(format!(
            "speaker playback needs a PCM output format, got {format}"
        ))),
    }
}

#[async_trait]
impl AudioPlayer for SpeakerPlayer {
    fn check_available(&self) -> Result<(), SpeechError> {
        device::check()
    }

    #[instrument(skip(self, audio), fields(format = %audio.format(), bytes = audio.size_bytes()))]
    async fn play(&self, audio: &AudioData) -> Result<(), SpeechError> {
        let pcm = decode_for_playback(audio)?;
        if pcm.is_empty() {
            debug!("Nothing to play");
            return Ok(());
        }

        let duration_ms = pcm.duration_ms();
        tokio::task::spawn_blocking(move || device::play(pcm))
            .await
            .map_err(|e| SpeechError::AudioDevice(format!("playback task failed: {e}")))??;

        debug!(duration_ms, "Playback finished");
        Ok(())
    }
}

#[cfg(feature = "audio-device")]
mod device {
    use std::sync::mpsc;
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, Sample, SampleFormat, SizedSample};
    use tracing::error;

    use crate::audio::{i16_to_f32, resample_linear};
    use crate::error::SpeechError;
    use crate::types::PcmBuffer;

    /// Extra time allowed on top of the clip length
    const DRAIN_GRACE: Duration = Duration::from_secs(2);

    pub(super) fn check() -> Result<(), SpeechError> {
        cpal::default_host()
            .default_output_device()
            .map(|_| ())
            .ok_or_else(|| SpeechError::AudioDevice("no default output device".to_string()))
    }

    pub(super) fn play(pcm: PcmBuffer) -> Result<(), SpeechError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| SpeechError::AudioDevice("no default output device".to_string()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| SpeechError::AudioDevice(e.to_string()))?;

        let device_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels());
        let config = supported.config();
        let samples = resample_linear(&pcm.samples, pcm.sample_rate, device_rate);
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build::<f32>(&device, &config, channels, samples, done_tx)?,
            SampleFormat::I16 => build::<i16>(&device, &config, channels, samples, done_tx)?,
            SampleFormat::U16 => build::<u16>(&device, &config, channels, samples, done_tx)?,
            other => {
                return Err(SpeechError::AudioDevice(format!(
                    "unsupported output sample format {other:?}"
                )));
            },
        };
        stream
            .play()
            .map_err(|e| SpeechError::AudioDevice(e.to_string()))?;

        let limit = Duration::from_millis(pcm.duration_ms()) + DRAIN_GRACE;
        done_rx
            .recv_timeout(limit)
            .map_err(|_| SpeechError::AudioDevice("output stream stalled".to_string()))?;

        // Let the device flush its last buffer
        std::thread::sleep(Duration::from_millis(100));
        drop(stream);
        Ok(())
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        channels: usize,
        samples: Vec<i16>,
        done_tx: mpsc::Sender<()>,
    ) -> Result<cpal::Stream, SpeechError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let mut source = samples.into_iter();
        let mut done = Some(done_tx);

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels.max(1)) {
                        let value = source.next().map_or_else(
                            || {
                                if let Some(tx) = done.take() {
                                    let _ = tx.send(());
                                }
                                0.0
                            },
                            i16_to_f32,
                        );
                        for out in frame.iter_mut() {
                            *out = T::from_sample(value);
                        }
                    }
                },
                |err| error!("playback stream error: {}", err),
                None,
            )
            .map_err(|e| SpeechError::AudioDevice(e.to_string()))
    }
}

#[cfg(not(feature = "audio-device"))]
mod device {
    use crate::error::SpeechError;
    use crate::types::PcmBuffer;

    pub(super) fn check() -> Result<(), SpeechError> {
        Err(SpeechError::NotAvailable(
            "speaker playback (built without the audio-device feature)".to_string(),
        ))
    }

    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn play(_pcm: PcmBuffer) -> Result<(), SpeechError> {
        check()
    }
}
