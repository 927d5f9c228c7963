//! Built-in policy for every accessibility category

use super::directives::{fairness_rationale, output_schema, prompt_directive};
use super::{AdjustmentRule, GenerationPolicy, PolicyTable, VoiceStyle};
use crate::category::AccessibilityCategory;
use crate::preferences::PreferenceSet;
use once_cell::sync::Lazy;

/// Process-wide read-only default table
pub static DEFAULT_POLICY_TABLE: Lazy<PolicyTable> = Lazy::new(PolicyTable::builtin);

pub(crate) fn builtin_policies() -> Vec<GenerationPolicy> {
    AccessibilityCategory::ALL
        .into_iter()
        .map(builtin_policy)
        .collect()
}

fn builtin_policy(category: AccessibilityCategory) -> GenerationPolicy {
    use AccessibilityCategory as C;

    let (extra_fields, scoring_adjustments): (&[&str], Vec<AdjustmentRule>) = match category {
        C::Speech => (
            &["read_aloud_script"],
            vec![AdjustmentRule::IgnoreDisfluency],
        ),
        C::Aac => (
            &["core_phrases"],
            vec![AdjustmentRule::IgnoreDisfluency, AdjustmentRule::CalmTone],
        ),
        C::Hearing => (
            &["diagram_descriptions", "image_search_queries"],
            vec![
                AdjustmentRule::DetailedWrittenFeedback,
                AdjustmentRule::SuppressSpokenFeedback,
            ],
        ),
        C::Autism => (
            &["vocabulary_glossary"],
            vec![
                AdjustmentRule::TruncateFeedback { max_sentences: 2 },
                AdjustmentRule::CalmTone,
                AdjustmentRule::SingleNextStep,
            ],
        ),
        C::Adhd => (
            &["hook", "checkpoint_questions"],
            vec![
                AdjustmentRule::TruncateFeedback { max_sentences: 2 },
                AdjustmentRule::SingleNextStep,
            ],
        ),
        C::Intellectual => (
            &["simplified_summary"],
            vec![AdjustmentRule::CalmTone, AdjustmentRule::SingleNextStep],
        ),
        C::Dyslexia => (&["phonetic_helpers"], Vec::new()),
        C::Visual => (&["audio_guide_script"], Vec::new()),
        C::Motor => (&["think_prompts"], Vec::new()),
        C::General => (&[], Vec::new()),
    };

    let mut required_fields = vec!["passage".to_string(), "questions".to_string()];
    required_fields.extend(extra_fields.iter().map(|f| f.to_string()));

    GenerationPolicy {
        category,
        prompt_directive: prompt_directive(category).to_string(),
        output_schema: output_schema(category).to_string(),
        required_fields,
        scoring_adjustments,
        default_preferences: default_preferences(category),
        voice_style: match category {
            C::Aac => VoiceStyle::Aac,
            C::Autism | C::Adhd | C::Intellectual => VoiceStyle::Calm,
            _ => VoiceStyle::Standard,
        },
        narrate: category != C::Hearing,
        narration_field: match category {
            C::Visual => Some("audio_guide_script".to_string()),
            C::Speech => Some("read_aloud_script".to_string()),
            _ => None,
        },
        audio_description: category == C::Visual,
        fairness_rationale: fairness_rationale(category).to_string(),
    }
}

fn default_preferences(category: AccessibilityCategory) -> PreferenceSet {
    use AccessibilityCategory as C;

    let base = PreferenceSet::default();
    match category {
        C::Speech => PreferenceSet {
            stammer_friendly: true,
            longer_response_window: true,
            ..base
        },
        C::Dyslexia => PreferenceSet {
            dyslexia_font: true,
            focus_line: true,
            font_scale: 1.2,
            ..base
        },
        C::Hearing => PreferenceSet {
            captions_always_on: true,
            visual_rubric: true,
            ..base
        },
        C::Aac => PreferenceSet {
            aac_mode: true,
            longer_response_window: true,
            ..base
        },
        C::Visual => PreferenceSet {
            high_contrast: true,
            font_scale: 1.5,
            ..base
        },
        C::Autism => PreferenceSet {
            sensory_friendly: true,
            gamification_off: true,
            ..base
        },
        C::Adhd => PreferenceSet {
            focus_line: true,
            ..base
        },
        C::Intellectual => PreferenceSet {
            visual_rubric: true,
            longer_response_window: true,
            ..base
        },
        C::Motor => PreferenceSet {
            longer_response_window: true,
            ..base
        },
        C::General => base,
    }
}
