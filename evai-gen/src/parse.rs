//! Parsing of LLM responses into structured values
//!
//! Models often wrap JSON in code fences or surround it with prose even when
//! asked not to, so every parser first isolates the outermost JSON object.

use crate::error::ParseError;
use crate::speech::types::NormalizationResult;
use crate::variants::types::{AdaptedContent, AudioStatus, DiagramDescription};
use evai_common::score::{is_valid_score, WordMark, WordMarks};
use evai_common::GenerationPolicy;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Fields mapped onto [`AdaptedContent`] rather than kept as extras
const CORE_FIELDS: &[&str] = &[
    "title",
    "passage",
    "summary",
    "key_concepts",
    "questions",
    "diagram_descriptions",
    "image_search_queries",
];

/// Isolate and decode the outermost JSON object of a model response
///
/// The raw braces are tried first, so backticks inside string values survive;
/// fences are only stripped when that fails.
pub fn extract_json(raw: &str) -> Result<Value, ParseError> {
    let text = raw.trim();
    decode_outermost(text).or_else(|err| {
        let body = strip_code_fences(text);
        if body == text {
            Err(err)
        } else {
            decode_outermost(body)
        }
    })
}

fn decode_outermost(text: &str) -> Result<Value, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJson)?;
    let end = text.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }

    serde_json::from_str(&text[start..=end]).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

fn strip_code_fences(text: &str) -> &str {
    let Some(fence_start) = text.find("```") else {
        return text;
    };
    let body = &text[fence_start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    match body.find("```") {
        Some(fence_end) => body[..fence_end].trim(),
        None => body.trim(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Summary fields sometimes come back as bullet arrays
fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Strings of an array; objects contribute their first string value
/// (`{"question": "..."}`), anything else is skipped
fn strings_of(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(o) => o.values().find_map(Value::as_str).map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn diagrams_of(value: Option<&Value>) -> Vec<DiagramDescription> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| serde_json::from_value::<DiagramDescription>(v.clone()).ok())
        .filter(|d| !d.description.trim().is_empty())
        .collect()
}

/// Decode one category payload and check the policy's required fields
pub fn parse_variant(raw: &str, policy: &GenerationPolicy) -> Result<AdaptedContent, ParseError> {
    let Value::Object(object) = extract_json(raw)? else {
        return Err(ParseError::InvalidJson("top-level value is not an object".into()));
    };

    let required = std::iter::once("passage").chain(policy.required_fields.iter().map(String::as_str));
    for field in required {
        if !object.get(field).is_some_and(is_present) {
            return Err(ParseError::MissingField(field.to_string()));
        }
    }

    let diagram_descriptions = diagrams_of(object.get("diagram_descriptions"));
    if policy
        .required_fields
        .iter()
        .any(|f| f == "diagram_descriptions")
        && diagram_descriptions.is_empty()
    {
        return Err(ParseError::MissingField("diagram_descriptions".into()));
    }

    let extras: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| !CORE_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(AdaptedContent {
        title: text_of(object.get("title")),
        passage: text_of(object.get("passage")),
        summary: text_of(object.get("summary")),
        key_concepts: strings_of(object.get("key_concepts")),
        questions: strings_of(object.get("questions")),
        diagram_descriptions,
        image_search_queries: strings_of(object.get("image_search_queries")),
        audio_description: policy.audio_description,
        extras,
        audio: None,
        audio_status: AudioStatus::NotRequested,
    })
}

#[derive(Debug, Deserialize)]
struct RawScores {
    #[serde(alias = "fluency")]
    base_fluency: f64,
    grammar: f64,
    confidence: f64,
    pronunciation: f64,
}

#[derive(Debug, Deserialize)]
struct RawScoring {
    scores: RawScores,
    #[serde(default)]
    feedback_text: String,
    #[serde(default)]
    word_marks: Vec<Value>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    next_steps: Vec<String>,
}

/// Structured scoring output before any accessibility adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutput {
    /// Fluency excluding disfluencies
    pub base_fluency: f64,
    pub grammar: f64,
    pub confidence: f64,
    pub pronunciation: f64,
    pub feedback_text: String,
    pub word_marks: WordMarks,
    pub strengths: Vec<String>,
    pub next_steps: Vec<String>,
}

pub fn parse_scoring(raw: &str) -> Result<ScoringOutput, ParseError> {
    let value = extract_json(raw)?;
    let parsed: RawScoring =
        serde_json::from_value(value).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let scores = [
        ("fluency", parsed.scores.base_fluency),
        ("grammar", parsed.scores.grammar),
        ("confidence", parsed.scores.confidence),
        ("pronunciation", parsed.scores.pronunciation),
    ];
    for (name, value) in scores {
        if !is_valid_score(value) {
            return Err(ParseError::OutOfRange(format!("{} = {}", name, value)));
        }
    }

    // Marks the model garbled are dropped rather than failing the whole score
    let word_marks: Vec<WordMark> = parsed
        .word_marks
        .into_iter()
        .filter_map(|v| serde_json::from_value::<WordMark>(v).ok())
        .filter(|m| !m.word.trim().is_empty())
        .collect();

    Ok(ScoringOutput {
        base_fluency: parsed.scores.base_fluency,
        grammar: parsed.scores.grammar,
        confidence: parsed.scores.confidence,
        pronunciation: parsed.scores.pronunciation,
        feedback_text: parsed.feedback_text.trim().to_string(),
        word_marks: WordMarks::new(word_marks),
        strengths: parsed.strengths,
        next_steps: parsed.next_steps,
    })
}

#[derive(Debug, Deserialize)]
struct RawNormalization {
    normalized_score: Option<f64>,
    #[serde(default)]
    justification: Option<String>,
}

/// Decode a normalization response; out-of-range scores are rejected, never clamped
pub fn parse_normalization(raw: &str) -> Result<NormalizationResult, ParseError> {
    let value = extract_json(raw)?;
    let parsed: RawNormalization =
        serde_json::from_value(value).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let score = parsed
        .normalized_score
        .ok_or_else(|| ParseError::MissingField("normalized_score".into()))?;
    if !is_valid_score(score) {
        return Err(ParseError::OutOfRange(format!("normalized_score = {}", score)));
    }

    let justification = parsed
        .justification
        .map(|j| j.trim().to_string())
        .filter(|j| !j.is_empty())
        .ok_or_else(|| ParseError::MissingField("justification".into()))?;

    Ok(NormalizationResult {
        normalized_score: score,
        justification,
    })
}
