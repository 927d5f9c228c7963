//! Speech assessment pipeline
//!
//! Sequential per submission:
//! Received → Transcribing → Scoring → Adjusting → (Normalizing) → (Synthesizing) → Complete
//!
//! Only Transcribing and Scoring can fail the assessment. The optional stages
//! degrade to absent values and record why.

use crate::backend::GenerationBackend;
use crate::error::{AssessmentError, BackendError};
use crate::normalize::ScoreNormalizer;
use crate::speech::adjust::{apply_adjustments, AdjustedSpeech};
use crate::speech::scoring::{score_transcript, ScoredSpeech};
use crate::speech::types::{
    AssessmentOptions, AssessmentResult, AssessmentSession, PipelineState, SpeechSubmission,
};
use crate::store::AudioStore;
use evai_common::{AccessibilityCategory, AdjustmentRule, PolicyTable, VoiceStyle};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Default number of submissions assessed at once by [`SpeechPipeline::assess_all`]
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Clone)]
pub struct SpeechPipeline {
    backend: Arc<dyn GenerationBackend>,
    policies: Arc<PolicyTable>,
    store: Arc<dyn AudioStore>,
    normalizer: ScoreNormalizer,
    concurrency: usize,
}

impl SpeechPipeline {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        policies: Arc<PolicyTable>,
        store: Arc<dyn AudioStore>,
    ) -> Self {
        let normalizer = ScoreNormalizer::new(Arc::clone(&backend), Arc::clone(&policies));
        Self {
            backend,
            policies,
            store,
            normalizer,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Assess one recorded answer
    pub async fn assess(
        &self,
        submission: SpeechSubmission,
        options: AssessmentOptions,
    ) -> Result<AssessmentResult, AssessmentError> {
        let started = Instant::now();
        let SpeechSubmission {
            session_id,
            audio,
            mode,
            category,
            accessibility_context,
        } = submission;

        let policy = self
            .policies
            .lookup(category)
            .map_err(|e| AssessmentError::Configuration(e.to_string()))?;
        let rules = self
            .policies
            .adjustments_for(category, &accessibility_context)
            .map_err(|e| AssessmentError::Configuration(e.to_string()))?;

        let mut session = AssessmentSession::new(session_id);
        tracing::info!(
            session_id = %session_id,
            category = %category,
            mode = %mode,
            audio_bytes = audio.len(),
            "Assessment started"
        );

        // Transcribing
        session.transition_to(PipelineState::Transcribing);
        let transcription = async {
            if audio.is_empty() {
                return Err(BackendError::invalid_input("submitted audio is empty"));
            }
            self.backend.transcribe(&audio).await
        };
        let transcribed = match options.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, transcription)
                .await
                .unwrap_or_else(|_| Err(BackendError::timeout("transcription deadline reached"))),
            None => transcription.await,
        };
        let transcript = match transcribed {
            Ok(transcript) => transcript,
            Err(e) => {
                session.transition_to(PipelineState::Failed);
                tracing::warn!(session_id = %session_id, error = %e, "Transcription failed");
                return Err(AssessmentError::Transcription(e));
            }
        };
        tracing::debug!(
            session_id = %session_id,
            transcript_chars = transcript.chars().count(),
            "Transcript received"
        );

        // Scoring
        session.transition_to(PipelineState::Scoring);
        let scored = match score_transcript(self.backend.as_ref(), &transcript, mode).await {
            Ok(scored) => scored,
            Err(e) => {
                session.transition_to(PipelineState::Failed);
                tracing::warn!(session_id = %session_id, error = %e, "Scoring failed");
                return Err(AssessmentError::Scoring(e));
            }
        };

        // Adjusting
        session.transition_to(PipelineState::Adjusting);
        let (adjusted, applied_adjustments, adjustment_error) =
            adjust_or_keep(session_id, category, &scored, rules);

        // Normalizing
        let mut normalization = None;
        let mut normalization_error = None;
        if options.normalize {
            session.transition_to(PipelineState::Normalizing);
            match self
                .normalizer
                .normalize(&transcript, &scored.raw_score, category)
                .await
            {
                Ok(result) => normalization = Some(result),
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Normalization failed");
                    normalization_error = Some(e.kind);
                }
            }
        }

        // Synthesizing
        let mut spoken_feedback_url = None;
        let mut spoken_feedback_error = None;
        let wants_speech = options.spoken_feedback
            && !adjusted.suppress_spoken
            && !adjusted.feedback.text.trim().is_empty();
        if wants_speech {
            session.transition_to(PipelineState::Synthesizing);
            let voice = if adjusted.calm_voice {
                VoiceStyle::Calm
            } else {
                policy.voice_style
            };
            match self
                .speak_feedback(session_id, &adjusted.feedback.text, voice)
                .await
            {
                Ok(url) => spoken_feedback_url = Some(url),
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Spoken feedback failed");
                    spoken_feedback_error = Some(e.kind);
                }
            }
        } else if options.spoken_feedback {
            tracing::debug!(session_id = %session_id, "Spoken feedback suppressed");
        }

        session.transition_to(PipelineState::Complete);
        tracing::info!(
            session_id = %session_id,
            category = %category,
            raw_mean = scored.raw_score.mean(),
            adjusted_mean = adjusted.score.mean(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Assessment complete"
        );

        Ok(AssessmentResult {
            session_id,
            mode,
            category,
            transcript,
            raw_score: scored.raw_score,
            adjusted_score: adjusted.score,
            word_marks: adjusted.word_marks,
            feedback: adjusted.feedback,
            applied_adjustments,
            adjustment_error,
            normalization,
            normalization_error,
            spoken_feedback_url,
            spoken_feedback_error,
            state: session.state,
            transitions: session.transitions,
        })
    }

    /// Assess independent submissions concurrently, in completion order
    pub async fn assess_all(
        &self,
        submissions: Vec<SpeechSubmission>,
        options: AssessmentOptions,
    ) -> Vec<(Uuid, Result<AssessmentResult, AssessmentError>)> {
        stream::iter(submissions)
            .map(|submission| async move {
                let session_id = submission.session_id;
                (session_id, self.assess(submission, options).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn speak_feedback(
        &self,
        session_id: Uuid,
        text: &str,
        voice: VoiceStyle,
    ) -> Result<String, BackendError> {
        let clip = self.backend.synthesize(text, voice).await?;
        let url = self
            .store
            .put(&format!("feedback/{}", session_id), &clip)
            .await?;
        Ok(url)
    }
}

/// Apply the rules, falling back to the unadjusted score when any is malformed.
///
/// Tables built through `PolicyTable::from_policies` reject malformed rules,
/// so the fallback only guards rule sets assembled some other way.
fn adjust_or_keep(
    session_id: Uuid,
    category: AccessibilityCategory,
    scored: &ScoredSpeech,
    rules: Vec<AdjustmentRule>,
) -> (AdjustedSpeech, Vec<AdjustmentRule>, Option<String>) {
    match apply_adjustments(scored, &rules) {
        Ok(adjusted) => (adjusted, rules, None),
        Err(e) => {
            tracing::warn!(
                session_id = %session_id,
                category = %category,
                error = %e,
                "Adjustment failed, keeping unadjusted score"
            );
            (AdjustedSpeech::unadjusted(scored), Vec::new(), Some(e.to_string()))
        }
    }
}
