//! Speech score vectors and per-word marks

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// One axis of a [`ScoreVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDimension {
    Fluency,
    Grammar,
    Confidence,
    Pronunciation,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; 4] = [
        ScoreDimension::Fluency,
        ScoreDimension::Grammar,
        ScoreDimension::Confidence,
        ScoreDimension::Pronunciation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreDimension::Fluency => "fluency",
            ScoreDimension::Grammar => "grammar",
            ScoreDimension::Confidence => "confidence",
            ScoreDimension::Pronunciation => "pronunciation",
        }
    }
}

impl fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-dimension speech score, every dimension within `[0, 10]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub fluency: f64,
    pub grammar: f64,
    pub confidence: f64,
    pub pronunciation: f64,
}

impl ScoreVector {
    /// Build a vector, rejecting any value outside the score range
    pub fn new(fluency: f64, grammar: f64, confidence: f64, pronunciation: f64) -> Result<Self> {
        let vector = Self {
            fluency,
            grammar,
            confidence,
            pronunciation,
        };
        vector.validate()?;
        Ok(vector)
    }

    pub fn get(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Fluency => self.fluency,
            ScoreDimension::Grammar => self.grammar,
            ScoreDimension::Confidence => self.confidence,
            ScoreDimension::Pronunciation => self.pronunciation,
        }
    }

    /// Set one dimension, clamping into range
    pub fn set(&mut self, dimension: ScoreDimension, value: f64) {
        let value = clamp_score(value);
        match dimension {
            ScoreDimension::Fluency => self.fluency = value,
            ScoreDimension::Grammar => self.grammar = value,
            ScoreDimension::Confidence => self.confidence = value,
            ScoreDimension::Pronunciation => self.pronunciation = value,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.fluency + self.grammar + self.confidence + self.pronunciation) / 4.0
    }

    pub fn validate(&self) -> Result<()> {
        for dimension in ScoreDimension::ALL {
            let value = self.get(dimension);
            if !is_valid_score(value) {
                return Err(Error::InvalidInput(format!(
                    "{} score {} outside [{}, {}]",
                    dimension, value, SCORE_MIN, SCORE_MAX
                )));
            }
        }
        Ok(())
    }

    /// Dimensions whose values differ between `self` and `other`
    pub fn changed_dimensions(&self, other: &ScoreVector) -> Vec<ScoreDimension> {
        ScoreDimension::ALL
            .into_iter()
            .filter(|d| (self.get(*d) - other.get(*d)).abs() > f64::EPSILON)
            .collect()
    }
}

pub fn is_valid_score(value: f64) -> bool {
    value.is_finite() && (SCORE_MIN..=SCORE_MAX).contains(&value)
}

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Issue attached to one transcribed word
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WordIssue {
    Pause,
    Hesitation,
    Repetition,
    Prolongation,
    Block,
    Filler,
    Mispronunciation,
    Grammar,
    /// Free-form issue reported by the scorer
    Other(String),
}

impl WordIssue {
    /// Whether this issue is a speech disfluency rather than an error
    pub fn is_disfluency(&self) -> bool {
        matches!(
            self,
            WordIssue::Pause
                | WordIssue::Hesitation
                | WordIssue::Repetition
                | WordIssue::Prolongation
                | WordIssue::Block
                | WordIssue::Filler
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            WordIssue::Pause => "pause",
            WordIssue::Hesitation => "hesitation",
            WordIssue::Repetition => "repetition",
            WordIssue::Prolongation => "prolongation",
            WordIssue::Block => "block",
            WordIssue::Filler => "filler",
            WordIssue::Mispronunciation => "mispronunciation",
            WordIssue::Grammar => "grammar",
            WordIssue::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for WordIssue {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pause" | "long pause" => WordIssue::Pause,
            "hesitation" => WordIssue::Hesitation,
            "repetition" => WordIssue::Repetition,
            "prolongation" => WordIssue::Prolongation,
            "block" => WordIssue::Block,
            "filler" | "filler word" => WordIssue::Filler,
            "mispronunciation" | "mispronounced" => WordIssue::Mispronunciation,
            "grammar" => WordIssue::Grammar,
            _ => WordIssue::Other(value),
        }
    }
}

impl From<WordIssue> for String {
    fn from(value: WordIssue) -> Self {
        value.as_str().to_string()
    }
}

/// One word of a transcript with an optional issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordMark {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<WordIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_sec: Option<f64>,
}

impl WordMark {
    pub fn plain(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            issue: None,
            suggestion: None,
            start_sec: None,
            end_sec: None,
        }
    }

    pub fn with_issue(word: impl Into<String>, issue: WordIssue) -> Self {
        Self {
            issue: Some(issue),
            ..Self::plain(word)
        }
    }

    pub fn is_disfluency(&self) -> bool {
        self.issue.as_ref().is_some_and(WordIssue::is_disfluency)
    }
}

/// Word marks of one transcript, in transcript order
///
/// Iteration is finite and can be restarted any number of times with
/// [`WordMarks::iter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordMarks(Vec<WordMark>);

impl WordMarks {
    pub fn new(marks: Vec<WordMark>) -> Self {
        Self(marks)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordMark> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn disfluency_count(&self) -> usize {
        self.iter().filter(|m| m.is_disfluency()).count()
    }

    /// Copy of these marks with every disfluency mark removed
    pub fn without_disfluencies(&self) -> WordMarks {
        WordMarks(
            self.iter()
                .filter(|m| !m.is_disfluency())
                .cloned()
                .collect(),
        )
    }

    pub fn into_vec(self) -> Vec<WordMark> {
        self.0
    }
}

impl From<Vec<WordMark>> for WordMarks {
    fn from(marks: Vec<WordMark>) -> Self {
        Self(marks)
    }
}

impl<'a> IntoIterator for &'a WordMarks {
    type Item = &'a WordMark;
    type IntoIter = std::slice::Iter<'a, WordMark>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
