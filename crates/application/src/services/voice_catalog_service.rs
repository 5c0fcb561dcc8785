//! Voice catalog service - Lists synthesis voices

use std::{fmt, io::Write, sync::Arc};

use ai_speech::{SpeechSynthesizer, VoiceInfo};
use tracing::instrument;

use crate::error::ApplicationError;

/// Service listing the voices of the configured region
pub struct VoiceCatalogService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl fmt::Debug for VoiceCatalogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceCatalogService").finish_non_exhaustive()
    }
}

impl VoiceCatalogService {
    /// Create a new voice catalog service
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Print the voices, optionally only those whose locale starts with
    /// `locale` (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError` if the listing fails or the console cannot
    /// be written.
    #[instrument(skip(self, out))]
    pub async fn list(
        &self,
        locale: Option<&str>,
        out: &mut impl Write,
    ) -> Result<Vec<VoiceInfo>, ApplicationError> {
        let wanted = locale.map(str::to_lowercase);
        let voices: Vec<VoiceInfo> = self
            .synthesizer
            .list_voices()
            .await?
            .into_iter()
            .filter(|voice| {
                wanted
                    .as_deref()
                    .is_none_or(|prefix| voice.locale.to_lowercase().starts_with(prefix))
            })
            .collect();

        for voice in &voices {
            writeln!(
                out,
                "🗣 {} ({}, {}, {})",
                voice.short_name, voice.display_name, voice.gender, voice.locale
            )?;
        }
        writeln!(out, "{} voice(s)", voices.len())?;
        Ok(voices)
    }
}
