//! Audio capture, playback and PCM helpers
//!
//! Device adapters live behind the `audio-device` feature. The sample
//! conversions and the utterance detector are always available.

mod capture;
mod file;
mod playback;
pub mod wav;

use serde::{Deserialize, Serialize};

use crate::error::SpeechError;

pub use capture::MicrophoneSource;
pub use file::WavFileSource;
pub use playback::{SpeakerPlayer, decode_for_playback};

/// Sample rate expected by the recognition endpoint
pub const RECOGNITION_SAMPLE_RATE: u32 = 16_000;

/// How a microphone capture decides the utterance is over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Hard upper bound on capture length
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
    /// Give up when no speech starts within this window
    #[serde(default = "default_initial_silence_ms")]
    pub initial_silence_ms: u64,
    /// Stop after this much silence following speech
    #[serde(default = "default_end_silence_ms")]
    pub end_silence_ms: u64,
    /// RMS level (0.0 - 1.0) above which a block counts as speech
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f32,
}

const fn default_max_duration_ms() -> u64 {
    15_000
}

const fn default_initial_silence_ms() -> u64 {
    5_000
}

const fn default_end_silence_ms() -> u64 {
    800
}

const fn default_silence_threshold() -> f32 {
    0.02
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            max_duration_ms: default_max_duration_ms(),
            initial_silence_ms: default_initial_silence_ms(),
            end_silence_ms: default_end_silence_ms(),
            silence_threshold: default_silence_threshold(),
        }
    }
}

impl CaptureSettings {
    /// Validate the capture windows
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` when a window is zero or the
    /// threshold is outside 0.0 - 1.0.
    pub fn validate(&self) -> Result<(), SpeechError> {
        if self.max_duration_ms == 0 || self.initial_silence_ms == 0 || self.end_silence_ms == 0 {
            return Err(SpeechError::Configuration(
                "capture windows must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.silence_threshold) {
            return Err(SpeechError::Configuration(format!(
                "silence threshold must be between 0.0 and 1.0, got {}",
                self.silence_threshold
            )));
        }
        Ok(())
    }
}

/// Why a capture stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEnd {
    /// Speech followed by enough trailing silence
    EndOfSpeech,
    /// Nothing above the threshold within the initial window
    NoSpeech,
    /// Maximum duration reached
    MaxDuration,
}

/// Progress reported by [`UtteranceDetector::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Keep capturing
    Listening,
    /// Stop capturing
    Finished(CaptureEnd),
}

/// Energy-based end-of-utterance detector over mono samples
#[derive(Debug, Clone)]
pub struct UtteranceDetector {
    threshold: f32,
    max_samples: u64,
    initial_silence_samples: u64,
    end_silence_samples: u64,
    samples_seen: u64,
    trailing_silence: u64,
    heard_speech: bool,
}

impl UtteranceDetector {
    /// Create a detector for the given sample rate
    #[must_use]
    pub fn new(settings: &CaptureSettings, sample_rate: u32) -> Self {
        Self {
            threshold: settings.silence_threshold,
            max_samples: ms_to_samples(settings.max_duration_ms, sample_rate),
            initial_silence_samples: ms_to_samples(settings.initial_silence_ms, sample_rate),
            end_silence_samples: ms_to_samples(settings.end_silence_ms, sample_rate),
            samples_seen: 0,
            trailing_silence: 0,
            heard_speech: false,
        }
    }

    /// Whether any block crossed the speech threshold
    #[must_use]
    pub const fn heard_speech(&self) -> bool {
        self.heard_speech
    }

    /// Feed the next block of mono samples
    pub fn push(&mut self, block: &[f32]) -> CaptureState {
        if block.is_empty() {
            return CaptureState::Listening;
        }

        let len = block.len() as u64;
        self.samples_seen += len;

        if rms(block) >= self.threshold {
            self.heard_speech = true;
            self.trailing_silence = 0;
        } else if self.heard_speech {
            self.trailing_silence += len;
        }

        if self.heard_speech && self.trailing_silence >= self.end_silence_samples {
            CaptureState::Finished(CaptureEnd::EndOfSpeech)
        } else if !self.heard_speech && self.samples_seen >= self.initial_silence_samples {
            CaptureState::Finished(CaptureEnd::NoSpeech)
        } else if self.samples_seen >= self.max_samples {
            CaptureState::Finished(CaptureEnd::MaxDuration)
        } else {
            CaptureState::Listening
        }
    }
}

const fn ms_to_samples(ms: u64, sample_rate: u32) -> u64 {
    ms * sample_rate as u64 / 1000
}

/// Root-mean-square level of a block
#[must_use]
pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let sum: f32 = block.iter().map(|s| s * s).sum();
    (sum / block.len() as f32).sqrt()
}

/// Average interleaved frames down to one channel
#[must_use]
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Convert a float sample to 16-bit PCM
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

/// Convert a 16-bit PCM sample to float
#[must_use]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / f32::from(i16::MAX)
}

/// Linear-interpolation resampler for mono 16-bit PCM
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn resample_linear(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = (samples.len() as u64 * u64::from(to_rate) / u64::from(from_rate)) as usize;
    let step = f64::from(from_rate) / f64::from(to_rate);
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos.floor() as usize).min(last);
            let frac = pos - idx as f64;
            let a = f64::from(samples[idx]);
            let b = f64::from(samples[(idx + 1).min(last)]);
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}
