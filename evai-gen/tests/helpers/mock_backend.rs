//! Scripted [`GenerationBackend`] for integration tests
//!
//! Every call is routed by its system prompt: variant prompts by the category
//! named in the user prompt, scoring and normalization prompts to their own
//! scripts. Calls are counted and in-flight generation calls are tracked so
//! tests can assert on fan-out bounds.

use super::fixtures::{scoring_reply, variant_reply};
use async_trait::async_trait;
use evai_common::{AccessibilityCategory, VoiceStyle};
use evai_gen::audio::AudioClip;
use evai_gen::backend::{GenerateOptions, GenerationBackend, Prompt};
use evai_gen::error::{BackendError, ErrorKind};
use evai_gen::prompt::{NORMALIZATION_SYSTEM_PROMPT, SCORING_SYSTEM_PROMPT, VARIANT_SYSTEM_PROMPT};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What one scripted call does
#[derive(Debug, Clone)]
pub enum Outcome {
    Reply(String),
    Fail(ErrorKind),
    /// Never completes
    Hang,
}

impl Outcome {
    async fn play(self) -> Result<String, BackendError> {
        match self {
            Outcome::Reply(text) => Ok(text),
            Outcome::Fail(kind) => Err(BackendError::new(kind, "scripted failure")),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

pub struct ScriptedBackend {
    variants: Mutex<HashMap<AccessibilityCategory, Outcome>>,
    transcript: Mutex<Outcome>,
    scoring: Mutex<Outcome>,
    normalization: Mutex<Outcome>,
    synthesis: Mutex<Outcome>,
    latency: Option<Duration>,

    pub generate_calls: AtomicUsize,
    pub transcribe_calls: AtomicUsize,
    pub synthesize_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub voices: Mutex<Vec<VoiceStyle>>,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedBackend {
    /// Every call succeeds with a well-formed reply
    pub fn new() -> Self {
        Self {
            variants: Mutex::new(HashMap::new()),
            transcript: Mutex::new(Outcome::Reply("I like to read books about space".into())),
            scoring: Mutex::new(Outcome::Reply(scoring_reply(8.0, &[]))),
            normalization: Mutex::new(Outcome::Reply(
                r#"{"normalized_score": 7.5, "justification": "Pauses were not penalized."}"#.into(),
            )),
            synthesis: Mutex::new(Outcome::Reply(String::new())),
            latency: None,
            generate_calls: AtomicUsize::new(0),
            transcribe_calls: AtomicUsize::new(0),
            synthesize_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            voices: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_variant(self, category: AccessibilityCategory, outcome: Outcome) -> Self {
        self.variants.lock().unwrap().insert(category, outcome);
        self
    }

    pub fn with_transcript(self, outcome: Outcome) -> Self {
        *self.transcript.lock().unwrap() = outcome;
        self
    }

    pub fn with_scoring(self, outcome: Outcome) -> Self {
        *self.scoring.lock().unwrap() = outcome;
        self
    }

    pub fn with_normalization(self, outcome: Outcome) -> Self {
        *self.normalization.lock().unwrap() = outcome;
        self
    }

    /// Any `Reply` text is ignored; a fixed MP3 clip is returned instead
    pub fn with_synthesis(self, outcome: Outcome) -> Self {
        *self.synthesis.lock().unwrap() = outcome;
        self
    }

    /// Delay every generation call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn generate_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn transcribe_count(&self) -> usize {
        self.transcribe_calls.load(Ordering::SeqCst)
    }

    pub fn synthesize_count(&self) -> usize {
        self.synthesize_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn variant_outcome(&self, prompt: &Prompt) -> Outcome {
        let category = AccessibilityCategory::ALL.into_iter().find(|c| {
            prompt
                .user
                .contains(&format!("Generate a {} study material", c.display_name()))
        });
        match category {
            Some(category) => self
                .variants
                .lock()
                .unwrap()
                .get(&category)
                .cloned()
                .unwrap_or_else(|| Outcome::Reply(variant_reply(category))),
            None => Outcome::Fail(ErrorKind::InvalidInput),
        }
    }
}

/// Decrements the in-flight counter even when the call is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        prompt: &Prompt,
        _options: &GenerateOptions,
    ) -> Result<String, BackendError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let outcome = if prompt.system == VARIANT_SYSTEM_PROMPT {
            self.variant_outcome(prompt)
        } else if prompt.system == SCORING_SYSTEM_PROMPT {
            self.scoring.lock().unwrap().clone()
        } else if prompt.system == NORMALIZATION_SYSTEM_PROMPT {
            self.normalization.lock().unwrap().clone()
        } else {
            Outcome::Fail(ErrorKind::InvalidInput)
        };
        outcome.play().await
    }

    async fn transcribe(&self, _audio: &AudioClip) -> Result<String, BackendError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.transcript.lock().unwrap().clone();
        outcome.play().await
    }

    async fn synthesize(&self, _text: &str, voice: VoiceStyle) -> Result<AudioClip, BackendError> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        self.voices.lock().unwrap().push(voice);
        let outcome = self.synthesis.lock().unwrap().clone();
        outcome.play().await?;
        Ok(AudioClip::new(b"ID3\x04\x00fake-mp3".to_vec(), "audio/mpeg"))
    }
}
