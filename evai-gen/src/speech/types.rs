//! Speech assessment submission, session and result types

use crate::audio::AudioClip;
use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use evai_common::score::{ScoreVector, WordMarks};
use evai_common::{AccessibilityCategory, AdjustmentRule, Error, PreferenceSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::time::Instant;
use uuid::Uuid;

/// Practice mode the student was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentMode {
    #[default]
    ReadAloud,
    StructuredPrompts,
    MockInterview,
}

impl AssessmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentMode::ReadAloud => "read-aloud",
            AssessmentMode::StructuredPrompts => "structured-prompts",
            AssessmentMode::MockInterview => "mock-interview",
        }
    }
}

impl fmt::Display for AssessmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "read-aloud" => Ok(AssessmentMode::ReadAloud),
            "structured-prompts" => Ok(AssessmentMode::StructuredPrompts),
            "mock-interview" => Ok(AssessmentMode::MockInterview),
            _ => Err(Error::InvalidInput(format!("Unknown assessment mode: '{}'", s))),
        }
    }
}

/// One recorded answer, consumed by a single assessment
#[derive(Debug, Clone)]
pub struct SpeechSubmission {
    pub session_id: Uuid,
    pub audio: AudioClip,
    pub mode: AssessmentMode,
    pub category: AccessibilityCategory,
    pub accessibility_context: PreferenceSet,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentOptions {
    /// Run the fairness normalization pass
    pub normalize: bool,
    /// Synthesize spoken feedback unless an adjustment suppresses it
    pub spoken_feedback: bool,
    /// Bounds the transcription stage only
    pub deadline: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTone {
    #[default]
    Encouraging,
    Calm,
    Detailed,
}

/// Written feedback shown (and optionally spoken) to the student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Feedback {
    pub text: String,
    pub tone: FeedbackTone,
    pub strengths: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Fairness-adjusted re-score, always additive to the raw score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub normalized_score: f64,
    pub justification: String,
}

/// Stage of one assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Received,
    Transcribing,
    Scoring,
    Adjusting,
    Normalizing,
    Synthesizing,
    Complete,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub old_state: PipelineState,
    pub new_state: PipelineState,
    pub transitioned_at: DateTime<Utc>,
}

/// In-memory progress of one submission through the pipeline
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    pub session_id: Uuid,
    pub state: PipelineState,
    pub transitions: Vec<StateTransition>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            state: PipelineState::Received,
            transitions: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Move to `new_state`, recording the transition
    pub fn transition_to(&mut self, new_state: PipelineState) {
        let transition = StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        tracing::debug!(
            session_id = %self.session_id,
            from = ?transition.old_state,
            to = ?new_state,
            "Assessment state transition"
        );
        self.state = new_state;
        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }
        self.transitions.push(transition);
    }
}

/// Everything produced for one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub session_id: Uuid,
    pub mode: AssessmentMode,
    pub category: AccessibilityCategory,
    pub transcript: String,
    pub raw_score: ScoreVector,
    pub adjusted_score: ScoreVector,
    pub word_marks: WordMarks,
    pub feedback: Feedback,
    pub applied_adjustments: Vec<AdjustmentRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_error: Option<String>,
    pub normalization: Option<NormalizationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization_error: Option<ErrorKind>,
    pub spoken_feedback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoken_feedback_error: Option<ErrorKind>,
    pub state: PipelineState,
    pub transitions: Vec<StateTransition>,
}
