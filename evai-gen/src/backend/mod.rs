//! Generation backend client
//!
//! [`GenerationBackend`] is the single seam between the core and the external
//! LLM / transcription / text-to-speech services. [`BackendClient`] is the
//! production implementation: it enforces input bounds before any network
//! call, bounds every attempt with a timeout, retries transient failures with
//! exponential backoff and optionally rate-limits all calls it makes.
//!
//! The wire protocols live behind the smaller [`LlmProvider`] and
//! [`SpeechProvider`] traits (see [`providers`]).

pub mod providers;
pub mod retry;

use crate::audio::AudioClip;
use crate::error::BackendError;
use async_trait::async_trait;
use evai_common::config::{EvaiConfig, LimitsConfig};
use evai_common::VoiceStyle;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use retry::{retry_transient, RetryPolicy};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub use providers::elevenlabs::ElevenLabsProvider;
pub use providers::openai_compat::OpenAiCompatProvider;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// System + user prompt pair for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }
}

/// Per-call generation options
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenerateOptions {
    /// Overrides the provider's configured temperature
    pub temperature: Option<f32>,
    /// Ask the provider for a JSON object response
    pub json_output: bool,
}

impl GenerateOptions {
    pub fn json(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            json_output: true,
        }
    }
}

/// The three operations the core needs from external model services
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerateOptions,
    ) -> Result<String, BackendError>;

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, BackendError>;

    async fn synthesize(&self, text: &str, voice: VoiceStyle) -> Result<AudioClip, BackendError>;
}

/// One attempt against a chat-completions style service
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        prompt: &Prompt,
        options: &GenerateOptions,
    ) -> Result<String, BackendError>;

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, BackendError>;
}

/// One attempt against a text-to-speech service
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn speak(&self, text: &str, voice: VoiceStyle) -> Result<AudioClip, BackendError>;
}

/// Production [`GenerationBackend`]
pub struct BackendClient {
    llm: Arc<dyn LlmProvider>,
    tts: Arc<dyn SpeechProvider>,
    retry: RetryPolicy,
    limits: LimitsConfig,
    llm_timeout: Duration,
    tts_timeout: Duration,
    rate_limiter: Option<Arc<DirectRateLimiter>>,
}

impl BackendClient {
    /// Client with default bounds, timeouts and retry policy, no rate limit
    pub fn new(llm: Arc<dyn LlmProvider>, tts: Arc<dyn SpeechProvider>) -> Self {
        let config = EvaiConfig::default();
        Self {
            llm,
            tts,
            retry: RetryPolicy::from(&config.retry),
            limits: config.limits,
            llm_timeout: Duration::from_millis(config.provider.timeout_ms),
            tts_timeout: Duration::from_millis(config.tts.timeout_ms),
            rate_limiter: None,
        }
    }

    /// Client talking to the configured HTTP providers
    pub fn from_config(config: &EvaiConfig) -> evai_common::Result<Self> {
        let llm = Arc::new(OpenAiCompatProvider::new(&config.provider)?);
        let tts = Arc::new(ElevenLabsProvider::new(&config.tts)?);

        let mut client = Self::new(llm, tts)
            .with_retry(RetryPolicy::from(&config.retry))
            .with_limits(config.limits.clone())
            .with_timeouts(
                Duration::from_millis(config.provider.timeout_ms),
                Duration::from_millis(config.tts.timeout_ms),
            );
        if let Some(rps) = config.provider.requests_per_second.and_then(NonZeroU32::new) {
            client = client.with_rate_limit(rps);
        }
        Ok(client)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Per-attempt timeouts for LLM calls and speech synthesis
    pub fn with_timeouts(mut self, llm_timeout: Duration, tts_timeout: Duration) -> Self {
        self.llm_timeout = llm_timeout;
        self.tts_timeout = tts_timeout;
        self
    }

    /// Limit every call of this client to `per_second` requests per second
    pub fn with_rate_limit(mut self, per_second: NonZeroU32) -> Self {
        self.rate_limiter = Some(Arc::new(RateLimiter::direct(Quota::per_second(per_second))));
        self
    }

    /// Run one operation under rate limit, attempt timeout and retry policy
    async fn call<T, F, Fut>(
        &self,
        operation: &str,
        attempt_timeout: Duration,
        attempt: F,
    ) -> Result<T, BackendError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let attempt = &attempt;
        retry_transient(operation, &self.retry, move || async move {
            // Waiting for a permit holds no lock
            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }
            match tokio::time::timeout(attempt_timeout, attempt()).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::timeout(format!(
                    "{} attempt exceeded {} ms",
                    operation,
                    attempt_timeout.as_millis()
                ))),
            }
        })
        .await
    }
}

#[async_trait]
impl GenerationBackend for BackendClient {
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerateOptions,
    ) -> Result<String, BackendError> {
        if prompt.user.trim().is_empty() {
            return Err(BackendError::invalid_input("prompt is empty"));
        }
        let chars = prompt.char_len();
        if chars > self.limits.max_prompt_chars {
            return Err(BackendError::invalid_input(format!(
                "prompt has {} characters, limit is {}",
                chars, self.limits.max_prompt_chars
            )));
        }

        tracing::debug!(prompt_chars = chars, "Dispatching generation call");
        self.call("generate", self.llm_timeout, || {
            self.llm.complete(prompt, options)
        })
        .await
    }

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, BackendError> {
        if audio.is_empty() {
            return Err(BackendError::invalid_input("audio is empty"));
        }
        if audio.len() > self.limits.max_audio_bytes {
            return Err(BackendError::invalid_input(format!(
                "audio has {} bytes, limit is {}",
                audio.len(),
                self.limits.max_audio_bytes
            )));
        }

        tracing::debug!(
            bytes = audio.len(),
            mime_type = %audio.mime_type,
            "Dispatching transcription call"
        );
        self.call("transcribe", self.llm_timeout, || self.llm.transcribe(audio))
            .await
    }

    async fn synthesize(&self, text: &str, voice: VoiceStyle) -> Result<AudioClip, BackendError> {
        if text.trim().is_empty() {
            return Err(BackendError::invalid_input("synthesis text is empty"));
        }
        let chars = text.chars().count();
        if chars > self.limits.max_synthesis_chars {
            return Err(BackendError::invalid_input(format!(
                "synthesis text has {} characters, limit is {}",
                chars, self.limits.max_synthesis_chars
            )));
        }

        tracing::debug!(text_chars = chars, voice = %voice, "Dispatching synthesis call");
        self.call("synthesize", self.tts_timeout, || self.tts.speak(text, voice))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Provider replaying a fixed sequence of outcomes, then succeeding
    struct SequenceProvider {
        outcomes: Mutex<Vec<Result<String, BackendError>>>,
        calls: AtomicU32,
        delay: Option<Duration>,
    }

    impl SequenceProvider {
        fn new(outcomes: Vec<Result<String, BackendError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicU32::new(0),
                delay: None,
            }
        }

        fn next(&self) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Ok("ok".to_string())
            } else {
                outcomes.remove(0)
            }
        }
    }

    #[async_trait]
    impl LlmProvider for SequenceProvider {
        async fn complete(
            &self,
            _prompt: &Prompt,
            _options: &GenerateOptions,
        ) -> Result<String, BackendError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.next()
        }

        async fn transcribe(&self, _audio: &AudioClip) -> Result<String, BackendError> {
            self.next()
        }
    }

    #[async_trait]
    impl SpeechProvider for SequenceProvider {
        async fn speak(&self, _text: &str, _voice: VoiceStyle) -> Result<AudioClip, BackendError> {
            self.next().map(|s| AudioClip::new(s.into_bytes(), "audio/mpeg"))
        }
    }

    fn client(provider: Arc<SequenceProvider>) -> BackendClient {
        BackendClient::new(provider.clone(), provider)
    }

    fn prompt() -> Prompt {
        Prompt::new("system", "user")
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let provider = Arc::new(SequenceProvider::new(vec![
            Err(BackendError::rate_limited("429")),
            Err(BackendError::timeout("504")),
        ]));
        let backend = client(provider.clone());

        let text = backend
            .generate(&prompt(), &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "ok");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_retried() {
        let provider = Arc::new(SequenceProvider::new(vec![Err(
            BackendError::invalid_input("422"),
        )]));
        let backend = client(provider.clone());

        let err = backend
            .generate(&prompt(), &GenerateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_oversize_prompt_rejected_without_call() {
        let provider = Arc::new(SequenceProvider::new(vec![]));
        let backend = client(provider.clone()).with_limits(LimitsConfig {
            max_prompt_chars: 5,
            ..LimitsConfig::default()
        });

        let err = backend
            .generate(&Prompt::new("", "far too long"), &GenerateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected_without_call() {
        let provider = Arc::new(SequenceProvider::new(vec![]));
        let backend = client(provider.clone());

        let empty_audio = AudioClip::new(Vec::new(), "audio/wav");
        assert_eq!(
            backend.transcribe(&empty_audio).await.unwrap_err().kind,
            ErrorKind::InvalidInput
        );
        assert_eq!(
            backend
                .synthesize("   ", VoiceStyle::Standard)
                .await
                .unwrap_err()
                .kind,
            ErrorKind::InvalidInput
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_times_out_and_is_retried() {
        let mut provider = SequenceProvider::new(vec![]);
        provider.delay = Some(Duration::from_secs(5));
        let provider = Arc::new(provider);
        let backend = client(provider.clone())
            .with_timeouts(Duration::from_millis(100), Duration::from_millis(100));

        let err = backend
            .generate(&prompt(), &GenerateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        // Each attempt is dropped at the timeout, before the provider counts it
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limited_client_still_serves_calls() {
        let provider = Arc::new(SequenceProvider::new(vec![]));
        let backend = client(provider.clone()).with_rate_limit(NonZeroU32::new(100).unwrap());

        for _ in 0..3 {
            backend
                .generate(&prompt(), &GenerateOptions::default())
                .await
                .unwrap();
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }
}
