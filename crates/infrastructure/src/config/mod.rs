//! Application configuration
//!
//! Layered sources, later ones winning:
//! - built-in defaults
//! - `speechlab.toml` in the working directory, or an explicit file
//! - `SPEECHLAB_*` environment variables, `__` between section and key
//!   (e.g. `SPEECHLAB_SPEECH__REGION`)
//!
//! Command-line credentials are applied on top by the caller through
//! [`SpeechAppConfig::apply_overrides`].

mod speech;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ai_speech::CaptureSettings;
use serde::{Deserialize, Serialize};

pub use speech::SpeechAppConfig;

/// Config file looked up when no path is given
pub const DEFAULT_CONFIG_NAME: &str = "speechlab";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "SPEECHLAB";

/// `[synthesis]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisAppConfig {
    /// SSML document read by the synthesis commands
    #[serde(default = "default_ssml_path")]
    pub ssml_path: PathBuf,

    /// Audio file written by the file synthesis command
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_ssml_path() -> PathBuf {
    PathBuf::from("demos/sample.ssml")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output.mp3")
}

impl Default for SynthesisAppConfig {
    fn default() -> Self {
        Self {
            ssml_path: default_ssml_path(),
            output_path: default_output_path(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when neither `-v` nor `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech service configuration
    #[serde(default)]
    pub speech: SpeechAppConfig,

    /// Microphone capture configuration
    #[serde(default)]
    pub capture: CaptureSettings,

    /// Synthesis input and output paths
    #[serde(default)]
    pub synthesis: SynthesisAppConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional file and the process environment
    ///
    /// Without `path`, `speechlab.toml` is read if present. An explicit path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map instead of the
    /// process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., SPEECHLAB_SPEECH__REGION)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the deserializer cannot
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.speech.timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "speech.timeout_ms must be greater than 0".to_string(),
            ));
        }
        self.capture
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))
    }
}
