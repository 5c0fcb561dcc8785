//! Infrastructure layer - Configuration loading and tracing setup

pub mod config;
pub mod telemetry;

pub use config::{AppConfig, LogFormat, LoggingConfig, SpeechAppConfig, SynthesisAppConfig};
pub use telemetry::{TelemetryError, init_tracing, log_filter};
