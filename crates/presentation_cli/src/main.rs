//! speechlab CLI
//!
//! Speech recognition with confidence scores and SSML synthesis to the
//! speaker or a file.

#![allow(clippy::print_stdout)]

use std::io;
use std::sync::Arc;

use ai_speech::{
    AudioOutputConfig, AudioSource, AzureSpeechProvider, MicrophoneSource, SpeakerPlayer,
    SpeechConfig, WavFileSource, build_speech_config,
};
use anyhow::Context;
use application::{
    RecognitionService, SsmlSource, SynthesisService, VoiceCatalogService, resolve_format,
};
use clap::Parser;
use infrastructure::{AppConfig, init_tracing, log_filter};
use presentation_cli::cli::{Cli, Commands, SsmlArgs};
use tracing::debug;

/// Pick the SSML source from the flags, falling back to the configured file
fn ssml_source(input: SsmlArgs, config: &AppConfig, speech: &SpeechConfig) -> SsmlSource {
    match (input.text, input.ssml) {
        (Some(text), _) => SsmlSource::Text {
            text,
            voice: speech.voice().to_string(),
            language: speech.language().to_string(),
        },
        (None, Some(path)) => SsmlSource::File(path),
        (None, None) => SsmlSource::File(config.synthesis.ssml_path.clone()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Set up logging based on verbosity
    init_tracing(
        &log_filter(cli.verbose, &config.logging.level),
        config.logging.format,
    )?;

    config.speech.apply_overrides(cli.key, cli.region);
    if let Commands::Recognize {
        format: Some(format),
        ..
    } = &cli.command
    {
        config.speech.recognition_format = *format;
    }

    let speech = build_speech_config(config.speech.speech_options()?)?;
    debug!(?speech, "Speech configuration ready");
    let provider = Arc::new(AzureSpeechProvider::new(speech.clone())?);

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Recognize { wav, .. } => {
            let source: Arc<dyn AudioSource> = match wav {
                Some(path) => Arc::new(WavFileSource::new(path)),
                None => Arc::new(MicrophoneSource::new(config.capture)?),
            };
            RecognitionService::new(provider, source)
                .run(&mut out)
                .await?;
        },

        Commands::Speak { input, format } => {
            let target = AudioOutputConfig::DefaultSpeaker;
            let format = resolve_format(&target, format, speech.synthesis_format());
            let source = ssml_source(input, &config, &speech);

            SynthesisService::new(provider, Arc::new(SpeakerPlayer::new()))
                .run_from(&source, &target, format, &mut out)
                .await?;
        },

        Commands::SynthesizeFile {
            input,
            output,
            format,
        } => {
            let target =
                AudioOutputConfig::File(output.unwrap_or_else(|| config.synthesis.output_path.clone()));
            let format = resolve_format(&target, format, speech.synthesis_format());
            let source = ssml_source(input, &config, &speech);

            SynthesisService::new(provider, Arc::new(SpeakerPlayer::new()))
                .run_from(&source, &target, format, &mut out)
                .await?;
        },

        Commands::Voices { locale } => {
            VoiceCatalogService::new(provider)
                .list(locale.as_deref(), &mut out)
                .await?;
        },
    }

    Ok(())
}
