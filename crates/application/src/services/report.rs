//! Console rendering of recognition and synthesis results
//!
//! Both pipelines share one taxonomy: a success line, a no-match line
//! (recognition only) and a failure line followed by the cancellation
//! details.

use std::io::{self, Write};

use ai_speech::{
    Alternative, AudioOutputConfig, CancellationDetails, RecognitionPayload, RecognitionResult,
    ResultReason, SynthesisResult,
};
use tracing::warn;

/// Alternatives carried in the detailed JSON payload of a result
///
/// Returns `None` when there is no payload, it cannot be parsed, or it has
/// no `NBest` array.
#[must_use]
pub fn alternatives(result: &RecognitionResult) -> Option<Vec<Alternative>> {
    let json = result.json.as_deref()?;
    match RecognitionPayload::from_json(json) {
        Ok(payload) => payload.nbest,
        Err(e) => {
            warn!(error = %e, "Recognition payload is not valid JSON");
            None
        },
    }
}

/// Print a recognition result
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn write_recognition(out: &mut impl Write, result: &RecognitionResult) -> io::Result<()> {
    match result.reason {
        ResultReason::RecognizedSpeech => {
            writeln!(
                out,
                "🔊 Recognized: {}",
                result.text.as_deref().unwrap_or_default()
            )?;
            match alternatives(result) {
                Some(alternatives) => {
                    writeln!(out, "\n📋 Alternatives with Confidence:")?;
                    for alternative in &alternatives {
                        writeln!(out, "🗣 {}", alternative.display)?;
                        writeln!(out, "📈 Confidence: {}\n", alternative.confidence)?;
                    }
                },
                None => writeln!(out, "⚠️ No 'NBest' confidence data found.")?,
            }
        },
        ResultReason::NoMatch => {
            writeln!(out, "❌ No recognizable speech.")?;
            if let Some(reason) = result.no_match_reason {
                writeln!(out, "   Reason: {reason}")?;
            }
        },
        ResultReason::Canceled | ResultReason::SynthesizingAudioCompleted => {
            writeln!(out, "⚠️ Recognition failed: {}", result.reason)?;
            write_details(out, result.cancellation.as_ref())?;
        },
    }
    Ok(())
}

/// Print a synthesis result for the given target
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn write_synthesis(
    out: &mut impl Write,
    result: &SynthesisResult,
    target: &AudioOutputConfig,
) -> io::Result<()> {
    if result.reason == ResultReason::SynthesizingAudioCompleted {
        match target {
            AudioOutputConfig::DefaultSpeaker => {
                writeln!(out, "✅ Speech synthesized successfully.")?;
            },
            AudioOutputConfig::File(path) => {
                writeln!(out, "✅ Speech synthesized successfully: {}", path.display())?;
            },
        }
    } else {
        writeln!(out, "⚠️ Speech synthesis failed: {}", result.reason)?;
        write_details(out, result.cancellation.as_ref())?;
    }
    Ok(())
}

fn write_details(out: &mut impl Write, details: Option<&CancellationDetails>) -> io::Result<()> {
    if let Some(details) = details {
        writeln!(out, "   Details: {details}")?;
    }
    Ok(())
}
