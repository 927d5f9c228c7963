//! Accessibility categories and learning styles
//!
//! The category set is closed: every policy lookup, prompt and scoring rule is
//! keyed by one of these tags.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Learner disability / accessibility profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessibilityCategory {
    /// Speech impairment, stammering
    #[serde(alias = "stammering")]
    Speech,
    Dyslexia,
    /// Deaf or hard of hearing
    Hearing,
    /// Augmentative and alternative communication users
    Aac,
    /// Blind or low vision
    Visual,
    Autism,
    Adhd,
    Intellectual,
    /// Motor / physical disability
    Motor,
    /// No specific profile, general inclusive material
    #[serde(alias = "none")]
    General,
}

impl AccessibilityCategory {
    /// Every category, in canonical order
    pub const ALL: [AccessibilityCategory; 10] = [
        AccessibilityCategory::Speech,
        AccessibilityCategory::Dyslexia,
        AccessibilityCategory::Hearing,
        AccessibilityCategory::Aac,
        AccessibilityCategory::Visual,
        AccessibilityCategory::Autism,
        AccessibilityCategory::Adhd,
        AccessibilityCategory::Intellectual,
        AccessibilityCategory::Motor,
        AccessibilityCategory::General,
    ];

    /// Lowercase tag used in prompts, logs and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessibilityCategory::Speech => "speech",
            AccessibilityCategory::Dyslexia => "dyslexia",
            AccessibilityCategory::Hearing => "hearing",
            AccessibilityCategory::Aac => "aac",
            AccessibilityCategory::Visual => "visual",
            AccessibilityCategory::Autism => "autism",
            AccessibilityCategory::Adhd => "adhd",
            AccessibilityCategory::Intellectual => "intellectual",
            AccessibilityCategory::Motor => "motor",
            AccessibilityCategory::General => "general",
        }
    }

    /// Human readable label used inside prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            AccessibilityCategory::Speech => "Speech / Stammering",
            AccessibilityCategory::Dyslexia => "Dyslexia",
            AccessibilityCategory::Hearing => "Hearing Impairment",
            AccessibilityCategory::Aac => "AAC (Augmentative and Alternative Communication)",
            AccessibilityCategory::Visual => "Visual Impairment",
            AccessibilityCategory::Autism => "Autism Spectrum",
            AccessibilityCategory::Adhd => "ADHD",
            AccessibilityCategory::Intellectual => "Intellectual Disability",
            AccessibilityCategory::Motor => "Motor / Physical Disability",
            AccessibilityCategory::General => "General Inclusive",
        }
    }
}

impl fmt::Display for AccessibilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessibilityCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "speech" | "stammering" => Ok(AccessibilityCategory::Speech),
            "dyslexia" => Ok(AccessibilityCategory::Dyslexia),
            "hearing" => Ok(AccessibilityCategory::Hearing),
            "aac" => Ok(AccessibilityCategory::Aac),
            "visual" => Ok(AccessibilityCategory::Visual),
            "autism" => Ok(AccessibilityCategory::Autism),
            "adhd" => Ok(AccessibilityCategory::Adhd),
            "intellectual" => Ok(AccessibilityCategory::Intellectual),
            "motor" => Ok(AccessibilityCategory::Motor),
            "general" | "none" => Ok(AccessibilityCategory::General),
            _ => Err(Error::InvalidInput(format!(
                "Unknown accessibility category: '{}'",
                s
            ))),
        }
    }
}

/// Preferred learning style of the target learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    ReadingWriting,
    Kinesthetic,
    #[default]
    None,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "visual",
            LearningStyle::Auditory => "auditory",
            LearningStyle::ReadingWriting => "reading_writing",
            LearningStyle::Kinesthetic => "kinesthetic",
            LearningStyle::None => "none",
        }
    }

    /// Extra prompt rule for this style, `None` when no style is declared
    pub fn prompt_addendum(&self) -> Option<&'static str> {
        match self {
            LearningStyle::Visual => {
                Some("- Emphasize visual metaphors, color mentions, and spatial relationships.")
            }
            LearningStyle::Auditory => {
                Some("- Make the text conversational and rhythmic, suitable for listening.")
            }
            LearningStyle::Kinesthetic => Some(
                "- Relate concepts to physical sensations, movement, and real-world actions.",
            ),
            LearningStyle::ReadingWriting => Some(
                "- Focus on deep textual analysis, rich vocabulary, and structured note-taking cues.",
            ),
            LearningStyle::None => None,
        }
    }
}

impl FromStr for LearningStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" => Ok(LearningStyle::Auditory),
            "reading_writing" | "reading/writing" => Ok(LearningStyle::ReadingWriting),
            "kinesthetic" => Ok(LearningStyle::Kinesthetic),
            "none" | "" => Ok(LearningStyle::None),
            other => Err(Error::InvalidInput(format!("Unknown learning style: '{}'", other))),
        }
    }
}
