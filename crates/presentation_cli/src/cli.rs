//! Command-line interface definition

use std::path::PathBuf;

use ai_speech::{RecognitionOutputFormat, SynthesisOutputFormat};
use clap::{Args, Parser, Subcommand};

/// speechlab CLI
#[derive(Debug, Parser)]
#[command(name = "speechlab-cli")]
#[command(author, version, about = "Azure speech recognition and synthesis", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./speechlab.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Speech resource subscription key
    #[arg(long, env = "SPEECH_KEY", hide_env_values = true, global = true)]
    pub key: Option<String>,

    /// Speech resource region, e.g. northeurope
    #[arg(long, env = "SPEECH_REGION", global = true)]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the SSML comes from
#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct SsmlArgs {
    /// SSML document to synthesize (default from config: demos/sample.ssml)
    #[arg(long)]
    pub ssml: Option<PathBuf>,

    /// Plain text to wrap in SSML with the configured voice
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Recognize one utterance and print the alternatives with confidence
    ///
    /// Example: speechlab-cli recognize
    /// Example: speechlab-cli recognize --wav question.wav
    Recognize {
        /// Read a 16-bit PCM WAV file instead of the microphone
        #[arg(long)]
        wav: Option<PathBuf>,

        /// Recognition payload shape (simple or detailed)
        #[arg(long)]
        format: Option<RecognitionOutputFormat>,
    },

    /// Synthesize SSML and play it on the default speaker
    Speak {
        #[command(flatten)]
        input: SsmlArgs,

        /// PCM output format (default: raw-16khz-16bit-mono-pcm)
        #[arg(long)]
        format: Option<SynthesisOutputFormat>,
    },

    /// Synthesize SSML into an audio file
    ///
    /// Example: speechlab-cli synthesize-file --output hello.mp3
    SynthesizeFile {
        #[command(flatten)]
        input: SsmlArgs,

        /// Output file (default from config: output.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: audio-16khz-32kbitrate-mono-mp3)
        #[arg(long)]
        format: Option<SynthesisOutputFormat>,
    },

    /// List the synthesis voices of the region
    Voices {
        /// Only voices whose locale starts with this, e.g. en or sv-SE
        #[arg(short, long)]
        locale: Option<String>,
    },
}
