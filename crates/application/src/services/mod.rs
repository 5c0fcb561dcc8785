//! Application services - Use case implementations

mod recognition_service;
pub mod report;
mod synthesis_service;
mod voice_catalog_service;

#[cfg(test)]
pub(crate) mod mocks;

pub use recognition_service::RecognitionService;
pub use synthesis_service::{
    SsmlSource, SynthesisService, default_format_for, format_fits, resolve_format,
};
pub use voice_catalog_service::VoiceCatalogService;
