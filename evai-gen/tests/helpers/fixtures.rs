//! Request, submission and model-reply fixtures

use evai_common::policy::DEFAULT_POLICY_TABLE;
use evai_common::{AccessibilityCategory, PolicyTable, PreferenceSet};
use evai_gen::audio::AudioClip;
use evai_gen::speech::{AssessmentMode, SpeechSubmission};
use evai_gen::variants::VariantRequest;
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub fn lesson_request(categories: &[AccessibilityCategory]) -> VariantRequest {
    VariantRequest {
        base_title: "The Water Cycle".to_string(),
        base_description: "Evaporation, condensation and precipitation, with everyday examples."
            .to_string(),
        target_grade: "5".to_string(),
        categories: categories.iter().copied().collect(),
        generate_audio: false,
        learning_style: None,
    }
}

/// Well-formed variant reply carrying every field the category's policy requires
pub fn variant_reply(category: AccessibilityCategory) -> String {
    let mut object = Map::new();
    object.insert("title".into(), json!(format!("Water Cycle ({})", category)));
    object.insert(
        "passage".into(),
        json!("Water warms up. It rises as vapour. It cools into clouds and falls as rain."),
    );
    object.insert("summary".into(), json!("Water moves in a loop."));
    object.insert("key_concepts".into(), json!(["evaporation", "condensation"]));
    object.insert("questions".into(), json!(["What makes water rise?"]));

    if let Ok(policy) = DEFAULT_POLICY_TABLE.lookup(category) {
        for field in &policy.required_fields {
            if object.contains_key(field) {
                continue;
            }
            let value = match field.as_str() {
                "diagram_descriptions" => json!([{
                    "concept": "evaporation",
                    "description": "Arrows rise from a lake toward the sun."
                }]),
                "image_search_queries" => json!(["water cycle diagram"]),
                other => Value::String(format!("{} for {}", other, category)),
            };
            object.insert(field.clone(), value);
        }
    }

    format!("```json\n{}\n```", Value::Object(object))
}

/// Scoring reply with `base_fluency` and one mark per `(word, issue)`
pub fn scoring_reply(base_fluency: f64, marks: &[(&str, &str)]) -> String {
    let word_marks: Vec<Value> = marks
        .iter()
        .map(|(word, issue)| json!({"word": word, "issue": issue, "suggestion": word}))
        .collect();
    json!({
        "scores": {
            "base_fluency": base_fluency,
            "grammar": 7.0,
            "confidence": 6.0,
            "pronunciation": 7.5
        },
        "feedback_text": "Great effort today. Your ideas were clear. Try linking your sentences. Keep practising!",
        "word_marks": word_marks,
        "strengths": ["clear ideas", "good volume"],
        "next_steps": ["link sentences with 'because'", "slow down at commas"]
    })
    .to_string()
}

pub fn audio_clip() -> AudioClip {
    AudioClip::new(b"RIFF\x24\x00\x00\x00WAVEfmt fake".to_vec(), "audio/wav")
}

pub fn submission(category: AccessibilityCategory, preferences: PreferenceSet) -> SpeechSubmission {
    SpeechSubmission {
        session_id: Uuid::new_v4(),
        audio: audio_clip(),
        mode: AssessmentMode::ReadAloud,
        category,
        accessibility_context: preferences,
    }
}

/// Built-in table with one category removed, as if misdeployed
pub fn policy_table_without(missing: AccessibilityCategory) -> PolicyTable {
    let policies = DEFAULT_POLICY_TABLE
        .policies()
        .filter(|p| p.category != missing)
        .cloned()
        .collect();
    PolicyTable::from_policies(policies).unwrap()
}
