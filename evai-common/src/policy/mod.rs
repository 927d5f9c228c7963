//! Accessibility policy table
//!
//! Pure lookup from [`AccessibilityCategory`] to everything that varies per
//! category: prompt directive, output schema, required payload fields, scoring
//! adjustments, default preferences and narration policy. The table is
//! read-only once built and is shared across tasks without locking.

mod defaults;
mod directives;
pub mod rules;

pub use defaults::DEFAULT_POLICY_TABLE;
pub use rules::AdjustmentRule;

use crate::category::AccessibilityCategory;
use crate::preferences::PreferenceSet;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Voice used when narrating content or feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStyle {
    #[default]
    Standard,
    /// Slower, steadier delivery for neurodivergent learners
    Calm,
    /// Calm delivery with the dedicated AAC classroom voice
    Aac,
}

impl fmt::Display for VoiceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceStyle::Standard => f.write_str("standard"),
            VoiceStyle::Calm => f.write_str("calm"),
            VoiceStyle::Aac => f.write_str("aac"),
        }
    }
}

/// Everything that varies per accessibility category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    pub category: AccessibilityCategory,
    /// Category-specific design rules appended to the generation prompt
    pub prompt_directive: String,
    /// JSON shape the model must return
    pub output_schema: String,
    /// Payload fields that must be present and non-empty
    pub required_fields: Vec<String>,
    pub scoring_adjustments: Vec<AdjustmentRule>,
    pub default_preferences: PreferenceSet,
    pub voice_style: VoiceStyle,
    /// Whether narration audio makes sense for this category at all
    pub narrate: bool,
    /// Payload field narrated instead of the passage, when present
    pub narration_field: Option<String>,
    pub audio_description: bool,
    /// Context given to the normalization pass
    pub fairness_rationale: String,
}

/// Category → policy lookup
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: BTreeMap<AccessibilityCategory, GenerationPolicy>,
}

impl PolicyTable {
    /// Table with one built-in policy per category
    pub fn builtin() -> Self {
        let policies = defaults::builtin_policies()
            .into_iter()
            .map(|p| (p.category, p))
            .collect();
        Self { policies }
    }

    /// Build a table from an explicit list of policies
    ///
    /// The list does not need to cover every category; coverage is checked
    /// by [`PolicyTable::validate`] against what a caller actually requests.
    pub fn from_policies(policies: Vec<GenerationPolicy>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for policy in policies {
            for rule in &policy.scoring_adjustments {
                rule.validate().map_err(|e| {
                    Error::Config(format!("policy for {}: {}", policy.category, e))
                })?;
            }
            let category = policy.category;
            if map.insert(category, policy).is_some() {
                return Err(Error::Config(format!(
                    "duplicate policy for category {}",
                    category
                )));
            }
        }
        Ok(Self { policies: map })
    }

    pub fn lookup(&self, category: AccessibilityCategory) -> Result<&GenerationPolicy> {
        self.policies.get(&category).ok_or_else(|| {
            Error::Config(format!("no generation policy for category {}", category))
        })
    }

    /// Fail if any requested category has no policy
    pub fn validate<'a, I>(&self, categories: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a AccessibilityCategory>,
    {
        let missing: Vec<&str> = categories
            .into_iter()
            .filter(|c| !self.policies.contains_key(c))
            .map(|c| c.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "policy table has no entry for: {}",
                missing.join(", ")
            )))
        }
    }

    /// Fail unless every category of the closed set is covered
    pub fn validate_complete(&self) -> Result<()> {
        self.validate(AccessibilityCategory::ALL.iter())
    }

    pub fn categories(&self) -> impl Iterator<Item = AccessibilityCategory> + '_ {
        self.policies.keys().copied()
    }

    pub fn policies(&self) -> impl Iterator<Item = &GenerationPolicy> {
        self.policies.values()
    }

    /// Caller preferences merged over the category defaults
    pub fn effective_preferences(
        &self,
        category: AccessibilityCategory,
        prefs: &PreferenceSet,
    ) -> Result<PreferenceSet> {
        Ok(prefs.merged_over(&self.lookup(category)?.default_preferences))
    }

    /// Category rules followed by preference-implied rules, deduplicated
    ///
    /// Preferences are merged over the category defaults first, so a category
    /// default flag always contributes its rules.
    pub fn adjustments_for(
        &self,
        category: AccessibilityCategory,
        prefs: &PreferenceSet,
    ) -> Result<Vec<AdjustmentRule>> {
        let policy = self.lookup(category)?;
        let effective = prefs.merged_over(&policy.default_preferences);

        let mut applied = Vec::new();
        rules::extend_unique(&mut applied, &policy.scoring_adjustments);
        rules::extend_unique(&mut applied, &rules_implied_by(&effective));

        debug!(
            category = %category,
            rules = applied.len(),
            "Resolved scoring adjustments"
        );
        Ok(applied)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        DEFAULT_POLICY_TABLE.clone()
    }
}

/// Adjustment rules switched on by individual preference flags
pub fn rules_implied_by(prefs: &PreferenceSet) -> Vec<AdjustmentRule> {
    let mut implied = Vec::new();
    if prefs.stammer_friendly {
        rules::extend_unique(&mut implied, &[AdjustmentRule::IgnoreDisfluency]);
    }
    if prefs.sensory_friendly {
        rules::extend_unique(
            &mut implied,
            &[
                AdjustmentRule::TruncateFeedback { max_sentences: 2 },
                AdjustmentRule::CalmTone,
                AdjustmentRule::SingleNextStep,
            ],
        );
    }
    if prefs.captions_always_on {
        rules::extend_unique(
            &mut implied,
            &[
                AdjustmentRule::DetailedWrittenFeedback,
                AdjustmentRule::SuppressSpokenFeedback,
            ],
        );
    }
    implied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_complete() {
        let table = PolicyTable::builtin();
        assert!(table.validate_complete().is_ok());
        assert_eq!(table.categories().count(), AccessibilityCategory::ALL.len());
    }

    #[test]
    fn test_every_policy_requires_passage() {
        for policy in DEFAULT_POLICY_TABLE.policies() {
            assert!(policy.required_fields.iter().any(|f| f == "passage"));
            assert!(!policy.prompt_directive.is_empty());
            assert!(!policy.fairness_rationale.is_empty());
        }
    }

    #[test]
    fn test_hearing_is_not_narrated_and_requires_diagrams() {
        let policy = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Hearing)
            .unwrap();
        assert!(!policy.narrate);
        assert!(policy
            .required_fields
            .contains(&"diagram_descriptions".to_string()));
    }

    #[test]
    fn test_visual_narrates_audio_guide() {
        let policy = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Visual)
            .unwrap();
        assert!(policy.audio_description);
        assert_eq!(policy.narration_field.as_deref(), Some("audio_guide_script"));
    }

    #[test]
    fn test_missing_category_is_config_error() {
        let speech = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Speech)
            .unwrap()
            .clone();
        let table = PolicyTable::from_policies(vec![speech]).unwrap();

        let requested = [AccessibilityCategory::Speech, AccessibilityCategory::Adhd];
        let err = table.validate(requested.iter()).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("adhd")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(table.lookup(AccessibilityCategory::Adhd).is_err());
    }

    #[test]
    fn test_duplicate_policy_rejected() {
        let speech = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Speech)
            .unwrap()
            .clone();
        assert!(PolicyTable::from_policies(vec![speech.clone(), speech]).is_err());
    }

    #[test]
    fn test_malformed_rule_rejected_at_build() {
        let mut adhd = DEFAULT_POLICY_TABLE
            .lookup(AccessibilityCategory::Adhd)
            .unwrap()
            .clone();
        adhd.scoring_adjustments = vec![AdjustmentRule::TruncateFeedback { max_sentences: 0 }];
        assert!(matches!(
            PolicyTable::from_policies(vec![adhd]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_adjustments_union_is_deduplicated() {
        let prefs = PreferenceSet {
            stammer_friendly: true,
            captions_always_on: true,
            ..Default::default()
        };
        let rules = DEFAULT_POLICY_TABLE
            .adjustments_for(AccessibilityCategory::Speech, &prefs)
            .unwrap();
        assert_eq!(
            rules,
            vec![
                AdjustmentRule::IgnoreDisfluency,
                AdjustmentRule::DetailedWrittenFeedback,
                AdjustmentRule::SuppressSpokenFeedback,
            ]
        );
    }

    #[test]
    fn test_general_without_preferences_has_no_rules() {
        let rules = DEFAULT_POLICY_TABLE
            .adjustments_for(AccessibilityCategory::General, &PreferenceSet::default())
            .unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_sensory_friendly_implies_calm_rules() {
        let prefs = PreferenceSet {
            sensory_friendly: true,
            ..Default::default()
        };
        let implied = rules_implied_by(&prefs);
        assert!(implied.contains(&AdjustmentRule::CalmTone));
        assert!(implied.contains(&AdjustmentRule::TruncateFeedback { max_sentences: 2 }));
    }
}
