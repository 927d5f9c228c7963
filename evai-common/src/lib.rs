//! # EVAI Common Library
//!
//! Shared code for the EVAI accessibility services:
//! - Closed accessibility category set and learning styles
//! - Accessibility preferences and their merge rules
//! - Policy table (prompt directives, output schemas, scoring adjustments)
//! - Speech score vectors and word marks
//! - Configuration loading
//! - Common error type

pub mod category;
pub mod config;
pub mod error;
pub mod policy;
pub mod preferences;
pub mod score;

pub use category::{AccessibilityCategory, LearningStyle};
pub use error::{Error, Result};
pub use policy::{AdjustmentRule, GenerationPolicy, PolicyTable, VoiceStyle};
pub use preferences::PreferenceSet;
pub use score::{ScoreDimension, ScoreVector, WordIssue, WordMark};
