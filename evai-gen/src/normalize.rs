//! Score normalization engine
//!
//! One generation call that re-interprets a raw score in light of the
//! learner's category. The raw score is only read, never modified.

use crate::backend::{GenerateOptions, GenerationBackend};
use crate::error::{BackendError, ErrorKind};
use crate::parse::parse_normalization;
use crate::prompt::normalization_prompt;
use crate::speech::types::NormalizationResult;
use evai_common::score::ScoreVector;
use evai_common::{AccessibilityCategory, PolicyTable};
use std::sync::Arc;

const NORMALIZATION_TEMPERATURE: f32 = 0.2;

#[derive(Clone)]
pub struct ScoreNormalizer {
    backend: Arc<dyn GenerationBackend>,
    policies: Arc<PolicyTable>,
}

impl ScoreNormalizer {
    pub fn new(backend: Arc<dyn GenerationBackend>, policies: Arc<PolicyTable>) -> Self {
        Self { backend, policies }
    }

    /// Fairness-adjusted score plus justification
    ///
    /// Backend errors are returned as-is. Output that cannot be parsed, lacks
    /// a justification or falls outside `[0, 10]` is `InvalidInput`.
    pub async fn normalize(
        &self,
        transcript: &str,
        raw_score: &ScoreVector,
        category: AccessibilityCategory,
    ) -> Result<NormalizationResult, BackendError> {
        let policy = self
            .policies
            .lookup(category)
            .map_err(|e| BackendError::new(ErrorKind::ConfigurationError, e.to_string()))?;
        raw_score
            .validate()
            .map_err(|e| BackendError::invalid_input(e.to_string()))?;

        let prompt = normalization_prompt(transcript, raw_score, policy);
        let raw = self
            .backend
            .generate(&prompt, &GenerateOptions::json(NORMALIZATION_TEMPERATURE))
            .await?;

        let result = parse_normalization(&raw).map_err(|e| {
            tracing::warn!(category = %category, error = %e, "Unusable normalization output");
            BackendError::invalid_input(format!("normalization output: {}", e))
        })?;

        tracing::debug!(
            category = %category,
            raw_mean = raw_score.mean(),
            normalized = result.normalized_score,
            "Score normalized"
        );
        Ok(result)
    }
}
