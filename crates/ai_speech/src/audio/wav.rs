//! Minimal RIFF/WAV encoding and decoding for 16-bit PCM
//!
//! The recognition endpoint takes a mono 16-bit PCM WAV body; the synthesis
//! endpoint returns RIFF PCM for the `riff-*` output formats.

use crate::error::SpeechError;
use crate::types::PcmBuffer;

const HEADER_LEN: usize = 44;
const PCM_FORMAT_TAG: u16 = 1;
const EXTENSIBLE_FORMAT_TAG: u16 = 0xFFFE;

/// Encode mono samples as a 16-bit PCM WAV file
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode(pcm: &PcmBuffer) -> Vec<u8> {
    let data_len = (pcm.samples.len() * 2) as u32;
    let byte_rate = pcm.sample_rate * 2;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // channels
    out.extend_from_slice(&pcm.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in &pcm.samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Decode a 16-bit PCM WAV file, downmixing to mono
///
/// # Errors
///
/// Returns `SpeechError::InvalidAudio` for anything that is not a
/// well-formed 16-bit integer PCM WAV file.
pub fn decode(bytes: &[u8]) -> Result<PcmBuffer, SpeechError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(SpeechError::InvalidAudio(
            "missing RIFF/WAVE header".to_string(),
        ));
    }

    let mut format: Option<(u16, u32)> = None;
    let mut offset = 12;

    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let declared = read_u32(bytes, offset + 4) as usize;
        let body_start = offset + 8;
        // Streaming writers leave the size at its maximum; clamp to what we have
        let body_end = body_start.saturating_add(declared).min(bytes.len());
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => format = Some(parse_fmt(body)?),
            b"data" => {
                let (channels, sample_rate) = format.ok_or_else(|| {
                    SpeechError::InvalidAudio("data chunk before fmt chunk".to_string())
                })?;
                return Ok(PcmBuffer::new(
                    interleaved_to_mono(body, channels),
                    sample_rate,
                ));
            },
            _ => {},
        }

        // Chunks are word aligned
        offset = body_end + (body_end - body_start) % 2;
    }

    Err(SpeechError::InvalidAudio("no data chunk".to_string()))
}

fn parse_fmt(body: &[u8]) -> Result<(u16, u32), SpeechError> {
    if body.len() < 16 {
        return Err(SpeechError::InvalidAudio("fmt chunk too short".to_string()));
    }

    let tag = read_u16(body, 0);
    let channels = read_u16(body, 2);
    let sample_rate = read_u32(body, 4);
    let bits = read_u16(body, 14);

    if tag != PCM_FORMAT_TAG && tag != EXTENSIBLE_FORMAT_TAG {
        return Err(SpeechError::InvalidAudio(format!(
            "unsupported WAV format tag {tag:#06x}, expected integer PCM"
        )));
    }
    if bits != 16 {
        return Err(SpeechError::InvalidAudio(format!(
            "unsupported bit depth {bits}, expected 16"
        )));
    }
    if channels == 0 || sample_rate == 0 {
        return Err(SpeechError::InvalidAudio(
            "WAV declares zero channels or zero sample rate".to_string(),
        ));
    }

    Ok((channels, sample_rate))
}

/// Little-endian 16-bit samples, averaged across channels
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn interleaved_to_mono(data: &[u8], channels: u16) -> Vec<i16> {
    let channels = usize::from(channels.max(1));
    let samples: Vec<i16> = data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    if channels == 1 {
        return samples;
    }

    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
