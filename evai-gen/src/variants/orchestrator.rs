//! Variant generation orchestrator
//!
//! Fans one lesson out to every requested category with bounded concurrency,
//! collects results as they complete and returns a partial-success report.
//!
//! Two phases share one deadline:
//! 1. Generation: one backend call per category. When the deadline passes (or
//!    the caller cancels) in-flight calls are dropped and their categories are
//!    recorded as `Timeout` failures.
//! 2. Narration (only when audio was requested): best-effort synthesis and
//!    storage for each successful variant. A narration failure is recorded on
//!    the variant's `audio_status` and never changes its status.

use crate::backend::{GenerateOptions, GenerationBackend};
use crate::error::{BackendError, ErrorKind, OrchestratorError};
use crate::parse::parse_variant;
use crate::prompt::variant_prompt;
use crate::store::AudioStore;
use crate::variants::types::{
    AdaptedContent, AudioReference, AudioStatus, FailedVariant, GenerationEvent, GenerationReport,
    VariantRequest, VariantResult,
};
use chrono::Utc;
use evai_common::config::GenerationConfig;
use evai_common::{AccessibilityCategory, PolicyTable};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

pub struct VariantOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    policies: Arc<PolicyTable>,
    store: Arc<dyn AudioStore>,
    concurrency: usize,
    deadline: Duration,
    event_tx: Option<mpsc::Sender<GenerationEvent>>,
}

impl VariantOrchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        policies: Arc<PolicyTable>,
        store: Arc<dyn AudioStore>,
    ) -> Self {
        Self {
            backend,
            policies,
            store,
            concurrency: DEFAULT_CONCURRENCY,
            deadline: DEFAULT_DEADLINE,
            event_tx: None,
        }
    }

    /// Concurrency and default deadline from the `[generation]` section
    pub fn with_config(self, config: &GenerationConfig) -> Self {
        self.with_concurrency(config.concurrency)
            .with_deadline(Duration::from_millis(config.deadline_ms))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Deadline applied by [`generate_variants`](Self::generate_variants)
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Report progress over `event_tx`
    pub fn with_events(mut self, event_tx: mpsc::Sender<GenerationEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Generate all variants within the configured deadline
    pub async fn generate_variants(
        &self,
        request: &VariantRequest,
    ) -> Result<GenerationReport, OrchestratorError> {
        self.generate_variants_until(request, Instant::now() + self.deadline)
            .await
    }

    pub async fn generate_variants_until(
        &self,
        request: &VariantRequest,
        deadline: Instant,
    ) -> Result<GenerationReport, OrchestratorError> {
        self.generate_variants_cancellable(request, deadline, &CancellationToken::new())
            .await
    }

    /// Generate variants until `deadline` or until `cancel` fires
    ///
    /// Cancellation behaves like an early deadline: unfinished categories
    /// fail with `Timeout` and the report is still returned.
    pub async fn generate_variants_cancellable(
        &self,
        request: &VariantRequest,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport, OrchestratorError> {
        if request.base_description.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "base_description must not be empty".to_string(),
            ));
        }
        if request.categories.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "at least one category is required".to_string(),
            ));
        }
        self.policies
            .validate(&request.categories)
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))?;

        let request_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = std::time::Instant::now();
        let total = request.categories.len();

        tracing::info!(
            request_id = %request_id,
            total,
            concurrency = self.concurrency,
            generate_audio = request.generate_audio,
            "Variant generation started"
        );
        self.emit_event(GenerationEvent::Started { request_id, total });

        // Phase 1: generation
        let mut completed: Vec<(AccessibilityCategory, Result<AdaptedContent, BackendError>)> =
            Vec::with_capacity(total);
        let mut deadline_reached = false;
        let mut cancelled = false;
        {
            let mut tasks = stream::iter(request.categories.iter().copied())
                .map(|category| self.generate_one(request, category))
                .buffer_unordered(self.concurrency);
            let expiry = tokio::time::sleep_until(deadline);
            tokio::pin!(expiry);

            loop {
                tokio::select! {
                    biased;
                    next = tasks.next() => match next {
                        Some((category, outcome)) => {
                            self.emit_outcome(request_id, category, &outcome);
                            completed.push((category, outcome));
                        }
                        None => break,
                    },
                    _ = &mut expiry => {
                        deadline_reached = true;
                        break;
                    }
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                }
            }
            // Dropping the stream abandons whatever is still in flight
        }

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (category, outcome) in completed {
            match outcome {
                Ok(payload) => succeeded.push(VariantResult::succeeded(category, payload)),
                Err(e) => failed.push(FailedVariant {
                    category,
                    error: e.kind,
                    message: e.message,
                }),
            }
        }

        let finished: BTreeSet<AccessibilityCategory> = succeeded
            .iter()
            .map(|r| r.category)
            .chain(failed.iter().map(|f| f.category))
            .collect();
        let reason = if cancelled {
            "cancelled before completion"
        } else {
            "deadline reached before completion"
        };
        for &category in request.categories.difference(&finished) {
            tracing::warn!(request_id = %request_id, category = %category, "{}", reason);
            self.emit_event(GenerationEvent::VariantFailed {
                request_id,
                category,
                error: ErrorKind::Timeout,
            });
            failed.push(FailedVariant {
                category,
                error: ErrorKind::Timeout,
                message: reason.to_string(),
            });
        }

        // Phase 2: narration
        if request.generate_audio && !cancelled {
            stream::iter(succeeded.iter_mut())
                .map(|result| self.narrate(request_id, result, deadline))
                .buffer_unordered(self.concurrency)
                .collect::<Vec<()>>()
                .await;
        }

        let report = GenerationReport {
            request_id,
            total,
            succeeded,
            failed,
            deadline_reached,
            cancelled,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            request_id = %request_id,
            total,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            deadline_reached,
            cancelled,
            elapsed_ms = report.duration_ms,
            "Variant generation completed"
        );
        self.emit_event(GenerationEvent::Completed {
            request_id,
            succeeded: report.succeeded.len(),
            failed: report.failed.len(),
            deadline_reached,
        });

        Ok(report)
    }

    /// One category: build prompt, call backend, parse. Never retried here.
    async fn generate_one(
        &self,
        request: &VariantRequest,
        category: AccessibilityCategory,
    ) -> (AccessibilityCategory, Result<AdaptedContent, BackendError>) {
        let outcome = async {
            let policy = self
                .policies
                .lookup(category)
                .map_err(|e| BackendError::new(ErrorKind::ConfigurationError, e.to_string()))?;
            let prompt = variant_prompt(request, policy);

            tracing::debug!(
                category = %category,
                prompt_chars = prompt.char_len(),
                "Dispatching variant generation"
            );
            let options = GenerateOptions {
                json_output: true,
                ..GenerateOptions::default()
            };
            let raw = self.backend.generate(&prompt, &options).await?;

            parse_variant(&raw, policy).map_err(|e| {
                BackendError::upstream(format!("unusable {} variant: {}", category, e))
            })
        }
        .await;

        (category, outcome)
    }

    /// Best-effort narration of one successful variant, bounded by `deadline`
    async fn narrate(&self, request_id: Uuid, result: &mut VariantResult, deadline: Instant) {
        let category = result.category;
        let Some(payload) = result.payload.as_mut() else {
            return;
        };
        let Ok(policy) = self.policies.lookup(category) else {
            payload.audio_status = AudioStatus::Failed {
                kind: ErrorKind::ConfigurationError,
            };
            return;
        };
        if !policy.narrate {
            payload.audio_status = AudioStatus::NotApplicable;
            return;
        }

        let (source_field, text) = policy
            .narration_field
            .as_deref()
            .and_then(|field| payload.text_field(field).map(|text| (field, text)))
            .unwrap_or(("passage", payload.passage.as_str()));
        let source_field = source_field.to_string();
        let text = text.to_string();
        let voice = policy.voice_style;
        let key = format!("variants/{}/{}", request_id, category);

        let narration = async {
            let clip = self.backend.synthesize(&text, voice).await?;
            let url = self.store.put(&key, &clip).await?;
            Ok::<_, BackendError>((url, clip.mime_type))
        };
        let outcome = tokio::time::timeout_at(deadline, narration)
            .await
            .unwrap_or_else(|_| Err(BackendError::timeout("narration deadline reached")));

        match outcome {
            Ok((url, mime_type)) => {
                tracing::debug!(category = %category, url = %url, "Narration attached");
                payload.audio = Some(AudioReference {
                    url,
                    mime_type,
                    voice,
                    source_field,
                });
                payload.audio_status = AudioStatus::Attached;
            }
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "Narration failed");
                payload.audio_status = AudioStatus::Failed { kind: e.kind };
            }
        }
    }

    fn emit_outcome(
        &self,
        request_id: Uuid,
        category: AccessibilityCategory,
        outcome: &Result<AdaptedContent, BackendError>,
    ) {
        let event = match outcome {
            Ok(_) => {
                tracing::info!(request_id = %request_id, category = %category, "Variant generated");
                GenerationEvent::VariantSucceeded {
                    request_id,
                    category,
                }
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    category = %category,
                    error = %e,
                    "Variant generation failed"
                );
                GenerationEvent::VariantFailed {
                    request_id,
                    category,
                    error: e.kind,
                }
            }
        };
        self.emit_event(event);
    }

    /// Never waits on the receiver; a full channel drops the event
    fn emit_event(&self, event: GenerationEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::debug!(event = ?event, "Event channel full, dropping progress event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
