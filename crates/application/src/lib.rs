//! Application layer - Speech pipelines
//!
//! Contains the recognition and synthesis use cases. Services depend only on
//! the ports defined in `ai_speech` and render console output to any
//! `io::Write`.

pub mod error;
pub mod services;

pub use error::ApplicationError;
pub use services::*;
