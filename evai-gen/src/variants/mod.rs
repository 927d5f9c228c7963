//! Per-category lesson variants

pub mod orchestrator;
pub mod types;

pub use orchestrator::VariantOrchestrator;
pub use types::{
    AdaptedContent, AudioReference, AudioStatus, FailedVariant, GenerationEvent, GenerationReport,
    VariantRequest, VariantResult, VariantStatus,
};
