//! Variant generation request, payload and report types

use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use evai_common::{AccessibilityCategory, LearningStyle, VoiceStyle};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One teacher-authored lesson to adapt for a set of categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRequest {
    pub base_title: String,
    pub base_description: String,
    pub target_grade: String,
    pub categories: BTreeSet<AccessibilityCategory>,
    #[serde(default)]
    pub generate_audio: bool,
    #[serde(default)]
    pub learning_style: Option<LearningStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDescription {
    pub concept: String,
    pub description: String,
}

/// Narration attached to a successful variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioReference {
    pub url: String,
    pub mime_type: String,
    pub voice: VoiceStyle,
    /// Payload field that was narrated
    pub source_field: String,
}

/// Narration outcome of one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AudioStatus {
    NotRequested,
    /// Category is never narrated
    NotApplicable,
    Attached,
    Failed { kind: ErrorKind },
}

/// Uniform container for every category's adapted lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptedContent {
    pub title: String,
    pub passage: String,
    pub summary: String,
    pub key_concepts: Vec<String>,
    pub questions: Vec<String>,
    pub diagram_descriptions: Vec<DiagramDescription>,
    pub image_search_queries: Vec<String>,
    /// Written to be consumed through a screen reader
    pub audio_description: bool,
    /// Category-specific fields (hook, glossary, phonetic helpers, ...)
    pub extras: Map<String, Value>,
    pub audio: Option<AudioReference>,
    pub audio_status: AudioStatus,
}

impl AdaptedContent {
    /// Text of a payload field, looking at core fields first, then extras
    pub fn text_field(&self, field: &str) -> Option<&str> {
        let text = match field {
            "title" => Some(self.title.as_str()),
            "passage" => Some(self.passage.as_str()),
            "summary" => Some(self.summary.as_str()),
            other => self.extras.get(other).and_then(Value::as_str),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    Succeeded,
    Failed,
}

/// Outcome of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    pub category: AccessibilityCategory,
    pub status: VariantStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<AdaptedContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl VariantResult {
    pub fn succeeded(category: AccessibilityCategory, payload: AdaptedContent) -> Self {
        Self {
            category,
            status: VariantStatus::Succeeded,
            payload: Some(payload),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedVariant {
    pub category: AccessibilityCategory,
    pub error: ErrorKind,
    pub message: String,
}

/// Partial-success aggregate for one request
///
/// `succeeded.len() + failed.len() == total` always holds. Results are in
/// completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub request_id: Uuid,
    pub total: usize,
    pub succeeded: Vec<VariantResult>,
    pub failed: Vec<FailedVariant>,
    pub deadline_reached: bool,
    /// Caller cancelled before every category completed
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn succeeded_categories(&self) -> BTreeSet<AccessibilityCategory> {
        self.succeeded.iter().map(|r| r.category).collect()
    }

    pub fn failed_categories(&self) -> BTreeSet<AccessibilityCategory> {
        self.failed.iter().map(|f| f.category).collect()
    }

    pub fn variant(&self, category: AccessibilityCategory) -> Option<&AdaptedContent> {
        self.succeeded
            .iter()
            .find(|r| r.category == category)
            .and_then(|r| r.payload.as_ref())
    }
}

/// Progress notifications for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    Started {
        request_id: Uuid,
        total: usize,
    },
    VariantSucceeded {
        request_id: Uuid,
        category: AccessibilityCategory,
    },
    VariantFailed {
        request_id: Uuid,
        category: AccessibilityCategory,
        error: ErrorKind,
    },
    Completed {
        request_id: Uuid,
        succeeded: usize,
        failed: usize,
        deadline_reached: bool,
    },
}
