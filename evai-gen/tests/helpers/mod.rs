//! Test helper utilities
//!
//! Scripted generation backends and request/submission fixtures shared by
//! the evai-gen integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_backend;

pub use fixtures::{
    audio_clip, lesson_request, policy_table_without, scoring_reply, submission, variant_reply,
};
pub use mock_backend::{Outcome, ScriptedBackend};
