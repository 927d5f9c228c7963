//! Accessibility adjustments of a scored transcript
//!
//! Rules are applied in a fixed order regardless of how they were listed:
//! disfluency removal, truncation, single next step, written detail, then
//! tone. Only `IgnoreDisfluency` may change a score, and only fluency.

use crate::speech::scoring::{raw_fluency, ScoredSpeech};
use crate::speech::types::{Feedback, FeedbackTone};
use evai_common::score::{ScoreVector, WordMarks};
use evai_common::{AdjustmentRule, Result};

/// Scored transcript after accessibility rules
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedSpeech {
    pub score: ScoreVector,
    pub word_marks: WordMarks,
    pub feedback: Feedback,
    /// Spoken feedback must not be synthesized
    pub suppress_spoken: bool,
    /// Spoken feedback should use the calm voice
    pub calm_voice: bool,
}

impl AdjustedSpeech {
    /// No rules applied
    pub fn unadjusted(scored: &ScoredSpeech) -> Self {
        Self {
            score: scored.raw_score,
            word_marks: scored.word_marks.clone(),
            feedback: scored.feedback.clone(),
            suppress_spoken: false,
            calm_voice: false,
        }
    }
}

/// Apply `rules` to `scored`, failing on the first malformed rule
///
/// On error nothing is applied; callers fall back to
/// [`AdjustedSpeech::unadjusted`].
pub fn apply_adjustments(scored: &ScoredSpeech, rules: &[AdjustmentRule]) -> Result<AdjustedSpeech> {
    for rule in rules {
        rule.validate()?;
    }

    let mut adjusted = AdjustedSpeech::unadjusted(scored);

    if rules.contains(&AdjustmentRule::IgnoreDisfluency) {
        adjusted.word_marks = scored.word_marks.without_disfluencies();
        adjusted.score.fluency = raw_fluency(scored.base_fluency, &adjusted.word_marks);
    }

    // Strictest truncation wins when several are present
    let max_sentences = rules
        .iter()
        .filter_map(|r| match r {
            AdjustmentRule::TruncateFeedback { max_sentences } => Some(*max_sentences),
            _ => None,
        })
        .min();
    if let Some(max) = max_sentences {
        adjusted.feedback.text = truncate_sentences(&adjusted.feedback.text, max);
    }

    if rules.contains(&AdjustmentRule::SingleNextStep) {
        adjusted.feedback.next_steps.truncate(1);
    }

    let detailed = rules.contains(&AdjustmentRule::DetailedWrittenFeedback);
    if detailed {
        append_word_notes(&mut adjusted.feedback.text, &adjusted.word_marks);
    }

    adjusted.calm_voice = rules.contains(&AdjustmentRule::CalmTone);
    adjusted.feedback.tone = if detailed {
        FeedbackTone::Detailed
    } else if adjusted.calm_voice {
        FeedbackTone::Calm
    } else {
        FeedbackTone::Encouraging
    };

    adjusted.suppress_spoken = rules.contains(&AdjustmentRule::SuppressSpokenFeedback);

    Ok(adjusted)
}

/// Sentences of `text`, each keeping its terminating punctuation
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

fn truncate_sentences(text: &str, max: usize) -> String {
    split_sentences(text)
        .into_iter()
        .take(max)
        .collect::<Vec<_>>()
        .join(" ")
}

fn append_word_notes(text: &mut String, marks: &WordMarks) {
    let notes: Vec<String> = marks
        .iter()
        .filter_map(|mark| {
            let issue = mark.issue.as_ref()?;
            Some(match &mark.suggestion {
                Some(suggestion) => format!("- \"{}\": {} → {}", mark.word, issue.as_str(), suggestion),
                None => format!("- \"{}\": {}", mark.word, issue.as_str()),
            })
        })
        .collect();

    if notes.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push_str("\n\n");
    }
    text.push_str("Word-by-word notes:\n");
    text.push_str(&notes.join("\n"));
}
