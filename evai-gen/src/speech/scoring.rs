//! Transcript scoring
//!
//! The model reports a base fluency that ignores disfluencies and lists every
//! disfluency as a word mark. The raw fluency is derived locally from both, so
//! removing disfluency marks can only ever raise fluency back to the base.

use crate::backend::{GenerateOptions, GenerationBackend};
use crate::error::BackendError;
use crate::parse::{parse_scoring, ScoringOutput};
use crate::prompt::scoring_prompt;
use crate::speech::types::{AssessmentMode, Feedback, FeedbackTone};
use evai_common::score::{clamp_score, ScoreVector, WordMarks};

/// Fluency points lost per disfluency mark in the raw score
pub const DISFLUENCY_PENALTY: f64 = 0.5;

const SCORING_TEMPERATURE: f32 = 0.3;

/// Unadjusted scoring result of one transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSpeech {
    pub raw_score: ScoreVector,
    pub base_fluency: f64,
    pub word_marks: WordMarks,
    pub feedback: Feedback,
}

/// Fluency after the per-mark disfluency penalty, clamped into range
pub fn raw_fluency(base_fluency: f64, word_marks: &WordMarks) -> f64 {
    clamp_score(base_fluency - DISFLUENCY_PENALTY * word_marks.disfluency_count() as f64)
}

impl From<ScoringOutput> for ScoredSpeech {
    fn from(output: ScoringOutput) -> Self {
        let raw_score = ScoreVector {
            fluency: raw_fluency(output.base_fluency, &output.word_marks),
            grammar: output.grammar,
            confidence: output.confidence,
            pronunciation: output.pronunciation,
        };
        Self {
            raw_score,
            base_fluency: output.base_fluency,
            word_marks: output.word_marks,
            feedback: Feedback {
                text: output.feedback_text,
                tone: FeedbackTone::Encouraging,
                strengths: output.strengths,
                next_steps: output.next_steps,
            },
        }
    }
}

/// One scoring call; unusable output is an upstream failure
pub async fn score_transcript(
    backend: &dyn GenerationBackend,
    transcript: &str,
    mode: AssessmentMode,
) -> Result<ScoredSpeech, BackendError> {
    let prompt = scoring_prompt(transcript, mode);
    let raw = backend
        .generate(&prompt, &GenerateOptions::json(SCORING_TEMPERATURE))
        .await?;

    let output = parse_scoring(&raw)
        .map_err(|e| BackendError::upstream(format!("scoring output: {}", e)))?;
    Ok(ScoredSpeech::from(output))
}
