//! Speech assessment: transcription, scoring, accessibility adjustments,
//! optional normalization and spoken feedback

pub mod adjust;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use pipeline::SpeechPipeline;
pub use types::{
    AssessmentMode, AssessmentOptions, AssessmentResult, AssessmentSession, Feedback,
    FeedbackTone, NormalizationResult, PipelineState, SpeechSubmission,
};
