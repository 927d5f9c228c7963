//! Prompt builders for generation, scoring and normalization calls

use crate::backend::Prompt;
use crate::speech::types::AssessmentMode;
use crate::variants::types::VariantRequest;
use evai_common::score::ScoreVector;
use evai_common::GenerationPolicy;

pub const VARIANT_SYSTEM_PROMPT: &str = "You are an elite special-education curriculum designer \
with 20 years of experience creating materials for students with disabilities.

You will be given a TOPIC, GRADE and a DESCRIPTION of what to teach. Generate a COMPLETE study \
material from scratch, optimized for one specific disability category. Every word, structure and \
element must be intentionally designed for that student profile.

CRITICAL: Output ONLY valid JSON. No markdown fences, no commentary outside the JSON object. \
The JSON must match the schema in the user prompt EXACTLY.";

pub const SCORING_SYSTEM_PROMPT: &str = "You are an expert English language coach providing \
structured feedback to students. Always output strict JSON. Be encouraging and constructive; \
never use harsh or discouraging language.";

pub const NORMALIZATION_SYSTEM_PROMPT: &str = "You are an assessment fairness reviewer for an \
inclusive classroom. You re-interpret raw speech scores in light of a student's accessibility \
profile so that disability-related features of speech are not penalized. Always output strict JSON.";

/// Prompt for one category variant
pub fn variant_prompt(request: &VariantRequest, policy: &GenerationPolicy) -> Prompt {
    let mut user = format!(
        "Generate a {} study material for:\nTopic: {} | Grade: {}\n\n\
         Teacher's Description:\n\"\"\"{}\"\"\"\n\n{}\n",
        policy.category.display_name(),
        request.base_title.trim(),
        request.target_grade.trim(),
        request.base_description.trim(),
        policy.prompt_directive,
    );

    if let Some(addendum) = request.learning_style.and_then(|s| s.prompt_addendum()) {
        user.push_str("\nLEARNING STYLE PREFERENCE:\n");
        user.push_str(addendum);
        user.push('\n');
    }

    user.push_str("\nOutput JSON:\n");
    user.push_str(&policy.output_schema);

    Prompt::new(VARIANT_SYSTEM_PROMPT, user)
}

/// Uniform scoring prompt; accessibility rules are applied locally afterwards
pub fn scoring_prompt(transcript: &str, mode: AssessmentMode) -> Prompt {
    let user = format!(
        r#"Analyze the following student speech transcript and provide detailed feedback.

Mode: {mode}
Transcript:
"""
{transcript}
"""

Score the student on a scale of 0-10 for each dimension and identify word-level issues.

Output JSON with this exact structure:
{{
  "scores": {{
    "base_fluency": <0-10>,
    "grammar": <0-10>,
    "confidence": <0-10>,
    "pronunciation": <0-10>
  }},
  "feedback_text": "<2-3 sentences of supportive, actionable feedback>",
  "word_marks": [
    {{"word": "<word>", "issue": "<pause|hesitation|repetition|prolongation|block|filler|mispronunciation|grammar>", "suggestion": "<correction>", "start_sec": <optional>, "end_sec": <optional>}}
  ],
  "strengths": ["<strength 1>", "<strength 2>"],
  "next_steps": ["<step 1>", "<step 2>"]
}}

Rules:
- base_fluency rates flow and pacing EXCLUDING pauses, hesitations, repetitions, prolongations, blocks and filler words. Those are reported only as word_marks.
- Mark every pause, hesitation, repetition, prolongation, block and filler word in word_marks, in transcript order.
- List at most 5 other issues (mispronunciation, grammar), the most impactful ones.
- feedback_text must be warm, supportive and end on a positive note.
- If the transcript is empty or inaudible, set all scores to 0 and give an encouraging retry message."#,
    );
    Prompt::new(SCORING_SYSTEM_PROMPT, user)
}

/// Fairness re-interpretation of a raw score
pub fn normalization_prompt(
    transcript: &str,
    raw_score: &ScoreVector,
    policy: &GenerationPolicy,
) -> Prompt {
    let user = format!(
        r#"A student's spoken answer was scored without any accessibility allowances.

Accessibility profile: {profile}
Fairness context: {rationale}

Transcript:
"""
{transcript}
"""

Raw scores (0-10):
- fluency: {fluency:.1}
- grammar: {grammar:.1}
- confidence: {confidence:.1}
- pronunciation: {pronunciation:.1}
- mean: {mean:.2}

Produce one overall score from 0 to 10 that fairly reflects the student's communication once the
fairness context is taken into account, and explain the adjustment in 1-3 sentences.

Output JSON with this exact structure:
{{"normalized_score": <0-10>, "justification": "<why the score differs from the raw mean>"}}"#,
        profile = policy.category.display_name(),
        rationale = policy.fairness_rationale,
        fluency = raw_score.fluency,
        grammar = raw_score.grammar,
        confidence = raw_score.confidence,
        pronunciation = raw_score.pronunciation,
        mean = raw_score.mean(),
    );
    Prompt::new(NORMALIZATION_SYSTEM_PROMPT, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evai_common::policy::DEFAULT_POLICY_TABLE;
    use evai_common::{AccessibilityCategory, LearningStyle};
    use std::collections::BTreeSet;

    fn request(style: Option<LearningStyle>) -> VariantRequest {
        VariantRequest {
            base_title: "Photosynthesis".to_string(),
            base_description: "How plants make food from light".to_string(),
            target_grade: "6".to_string(),
            categories: BTreeSet::from([AccessibilityCategory::Dyslexia]),
            generate_audio: false,
            learning_style: style,
        }
    }

    #[test]
    fn test_variant_prompt_embeds_directive_and_schema() {
        let policy = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Dyslexia)
            .unwrap();
        let prompt = variant_prompt(&request(None), policy);

        assert_eq!(prompt.system, VARIANT_SYSTEM_PROMPT);
        assert!(prompt.user.contains("Topic: Photosynthesis | Grade: 6"));
        assert!(prompt.user.contains(&policy.prompt_directive));
        assert!(prompt.user.contains("phonetic_helpers"));
        assert!(!prompt.user.contains("LEARNING STYLE"));
    }

    #[test]
    fn test_learning_style_addendum_appended() {
        let policy = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::General)
            .unwrap();
        let prompt = variant_prompt(&request(Some(LearningStyle::Kinesthetic)), policy);
        assert!(prompt.user.contains("LEARNING STYLE PREFERENCE"));
        assert!(prompt.user.contains("physical sensations"));

        let none = variant_prompt(&request(Some(LearningStyle::None)), policy);
        assert!(!none.user.contains("LEARNING STYLE"));
    }

    #[test]
    fn test_scoring_prompt_has_no_accessibility_addenda() {
        let prompt = scoring_prompt("I l-l-like cats", AssessmentMode::ReadAloud);
        assert!(prompt.user.contains("Mode: read-aloud"));
        assert!(prompt.user.contains("base_fluency"));
        assert!(!prompt.user.to_lowercase().contains("stammer"));
    }

    #[test]
    fn test_normalization_prompt_embeds_rationale_and_mean() {
        let policy = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Speech)
            .unwrap();
        let raw = ScoreVector::new(4.0, 8.0, 6.0, 6.0).unwrap();
        let prompt = normalization_prompt("hello", &raw, policy);
        assert!(prompt.user.contains(&policy.fairness_rationale));
        assert!(prompt.user.contains("mean: 6.00"));
    }
}
