//! Policy table behavior across the whole category set

use evai_common::score::{ScoreVector, WordIssue, WordMark, WordMarks};
use evai_common::{AccessibilityCategory, AdjustmentRule, PolicyTable, PreferenceSet};
use std::sync::Arc;

#[test]
fn test_every_category_resolves_policy_and_rules() {
    let table = PolicyTable::builtin();
    for category in AccessibilityCategory::ALL {
        let policy = table.lookup(category).unwrap();
        assert_eq!(policy.category, category);
        let rules = table
            .adjustments_for(category, &PreferenceSet::default())
            .unwrap();
        for rule in &rules {
            assert!(rule.validate().is_ok());
        }
    }
}

#[test]
fn test_category_default_rules_match_table() {
    let table = PolicyTable::builtin();
    let none = PreferenceSet::default();

    let speech = table
        .adjustments_for(AccessibilityCategory::Speech, &none)
        .unwrap();
    assert_eq!(speech, vec![AdjustmentRule::IgnoreDisfluency]);

    let hearing = table
        .adjustments_for(AccessibilityCategory::Hearing, &none)
        .unwrap();
    assert_eq!(
        hearing,
        vec![
            AdjustmentRule::DetailedWrittenFeedback,
            AdjustmentRule::SuppressSpokenFeedback
        ]
    );

    let adhd = table
        .adjustments_for(AccessibilityCategory::Adhd, &none)
        .unwrap();
    assert_eq!(
        adhd,
        vec![
            AdjustmentRule::TruncateFeedback { max_sentences: 2 },
            AdjustmentRule::SingleNextStep
        ]
    );
}

#[test]
fn test_preferences_extend_general_rules() {
    let table = PolicyTable::builtin();
    let prefs = PreferenceSet {
        stammer_friendly: true,
        ..Default::default()
    };
    let rules = table
        .adjustments_for(AccessibilityCategory::General, &prefs)
        .unwrap();
    assert_eq!(rules, vec![AdjustmentRule::IgnoreDisfluency]);
}

#[test]
fn test_table_shared_across_threads() {
    let table = Arc::new(PolicyTable::builtin());
    let handles: Vec<_> = AccessibilityCategory::ALL
        .into_iter()
        .map(|category| {
            let table = Arc::clone(&table);
            std::thread::spawn(move || table.lookup(category).map(|p| p.category).ok())
        })
        .collect();

    for (handle, category) in handles.into_iter().zip(AccessibilityCategory::ALL) {
        assert_eq!(handle.join().unwrap(), Some(category));
    }
}

#[test]
fn test_score_and_marks_types_compose() {
    let score = ScoreVector::new(6.0, 7.0, 8.0, 9.0).unwrap();
    assert_eq!(score.mean(), 7.5);

    let marks = WordMarks::new(vec![
        WordMark::with_issue("th-th-the", WordIssue::Repetition),
        WordMark::plain("cat"),
    ]);
    assert_eq!(marks.disfluency_count(), 1);
}
