//! evai-gen: accessibility variant generation and speech assessment
//!
//! - [`variants::VariantOrchestrator`] adapts one lesson for many accessibility
//!   categories at once and reports per-category success or failure.
//! - [`speech::SpeechPipeline`] transcribes, scores and adjusts a recorded
//!   answer, optionally normalizing the score and speaking the feedback.
//! - [`backend::BackendClient`] is the only component that talks to model
//!   providers; everything else depends on the [`backend::GenerationBackend`]
//!   trait.

pub mod audio;
pub mod backend;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod prompt;
pub mod speech;
pub mod store;
pub mod variants;

pub use crate::audio::AudioClip;
pub use crate::backend::{BackendClient, GenerationBackend};
pub use crate::error::{AssessmentError, BackendError, ErrorKind, OrchestratorError};
pub use crate::normalize::ScoreNormalizer;
pub use crate::speech::SpeechPipeline;
pub use crate::store::{AudioStore, FsAudioStore, InMemoryAudioStore};
pub use crate::variants::VariantOrchestrator;

/// Short git hash of the build
pub const GIT_HASH: &str = env!("EVAI_GIT_HASH");
/// RFC 3339 build timestamp
pub const BUILD_TIMESTAMP: &str = env!("EVAI_BUILD_TIMESTAMP");
/// Cargo profile (debug/release)
pub const BUILD_PROFILE: &str = env!("EVAI_BUILD_PROFILE");
