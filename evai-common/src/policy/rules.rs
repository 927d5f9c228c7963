//! Score-interpretation adjustment rules

use crate::score::ScoreDimension;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One accessibility rule applied when interpreting a speech score
///
/// Each rule declares the score dimensions it may alter
/// ([`AdjustmentRule::affected_dimensions`]). Rules with an empty declaration
/// only touch feedback presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AdjustmentRule {
    /// Drop disfluency marks and recompute fluency without them
    IgnoreDisfluency,
    /// Keep at most `max_sentences` sentences of feedback
    TruncateFeedback { max_sentences: usize },
    CalmTone,
    /// Keep exactly one next step
    SingleNextStep,
    /// Append per-word suggestions to the written feedback
    DetailedWrittenFeedback,
    /// No synthesized spoken feedback
    SuppressSpokenFeedback,
}

impl AdjustmentRule {
    /// Score dimensions this rule is allowed to change
    pub fn affected_dimensions(&self) -> &'static [ScoreDimension] {
        match self {
            AdjustmentRule::IgnoreDisfluency => &[ScoreDimension::Fluency],
            AdjustmentRule::TruncateFeedback { .. }
            | AdjustmentRule::CalmTone
            | AdjustmentRule::SingleNextStep
            | AdjustmentRule::DetailedWrittenFeedback
            | AdjustmentRule::SuppressSpokenFeedback => &[],
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            AdjustmentRule::TruncateFeedback { max_sentences: 0 } => Err(Error::InvalidInput(
                "truncate_feedback requires max_sentences >= 1".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdjustmentRule::IgnoreDisfluency => "ignore_disfluency",
            AdjustmentRule::TruncateFeedback { .. } => "truncate_feedback",
            AdjustmentRule::CalmTone => "calm_tone",
            AdjustmentRule::SingleNextStep => "single_next_step",
            AdjustmentRule::DetailedWrittenFeedback => "detailed_written_feedback",
            AdjustmentRule::SuppressSpokenFeedback => "suppress_spoken_feedback",
        }
    }
}

impl fmt::Display for AdjustmentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentRule::TruncateFeedback { max_sentences } => {
                write!(f, "{}({})", self.name(), max_sentences)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Append `rules` to `into`, skipping any rule already present
pub fn extend_unique(into: &mut Vec<AdjustmentRule>, rules: &[AdjustmentRule]) {
    for rule in rules {
        if !into.contains(rule) {
            into.push(*rule);
        }
    }
}
