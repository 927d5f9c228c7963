//! Configuration loading and resolution
//!
//! The configuration file is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `EVAI_CONFIG` environment variable
//! 3. `<config_dir>/evai/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! Provider secrets are read from the environment after the file, so
//! `EVAI_PROVIDER_API_KEY` / `EVAI_TTS_API_KEY` always win over TOML values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "EVAI_CONFIG";
pub const PROVIDER_API_KEY_ENV_VAR: &str = "EVAI_PROVIDER_API_KEY";
pub const TTS_API_KEY_ENV_VAR: &str = "EVAI_TTS_API_KEY";

/// Top-level configuration, one field per TOML section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaiConfig {
    pub provider: ProviderConfig,
    pub tts: TtsConfig,
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

/// `[provider]` OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Model used for audio transcription (multimodal chat completion)
    pub transcription_model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Per-attempt request timeout
    pub timeout_ms: u64,
    /// Shared request rate limit; `None` disables limiting
    pub requests_per_second: Option<u32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            transcription_model: "google/gemini-2.5-flash".to_string(),
            api_key: None,
            temperature: 0.7,
            timeout_ms: 60_000,
            requests_per_second: None,
        }
    }
}

/// `[tts]` text-to-speech endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model_id: String,
    pub voice_id: String,
    pub aac_voice_id: String,
    pub timeout_ms: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io/v1".to_string(),
            api_key: None,
            model_id: "eleven_multilingual_v2".to_string(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            aac_voice_id: "AZnzlk1XvdvUeBnXmlld".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// `[generation]` fan-out and deadlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum categories (or submissions) in flight at once
    pub concurrency: usize,
    /// Overall deadline for one variant generation request
    pub deadline_ms: u64,
    /// Deadline for the transcription stage of one assessment
    pub transcription_deadline_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            deadline_ms: 120_000,
            transcription_deadline_ms: 60_000,
        }
    }
}

/// `[retry]` backoff for transient backend errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            multiplier: 2.0,
            max_backoff_ms: 2_000,
        }
    }
}

/// `[limits]` input bounds enforced before any network call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_prompt_chars: usize,
    pub max_audio_bytes: usize,
    pub max_synthesis_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 32_000,
            max_audio_bytes: 25 * 1024 * 1024,
            max_synthesis_chars: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[storage]` where synthesized audio is written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub audio_dir: Option<PathBuf>,
    /// Prefix for returned audio URLs; `file://` paths when unset
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    pub fn resolved_audio_dir(&self) -> PathBuf {
        self.audio_dir.clone().unwrap_or_else(default_audio_dir)
    }
}

impl EvaiConfig {
    /// Resolve, read, apply env secrets and validate
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                Self::from_file(&path)?
            }
            Some(path) => {
                warn!(
                    path = %path.display(),
                    "Configuration file not found, using compiled defaults"
                );
                Self::default()
            }
            None => {
                warn!("No configuration directory available, using compiled defaults");
                Self::default()
            }
        };

        config.apply_env_secrets();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Environment secrets override anything read from TOML
    pub fn apply_env_secrets(&mut self) {
        if let Some(key) = non_empty_env(PROVIDER_API_KEY_ENV_VAR) {
            self.provider.api_key = Some(key);
        }
        if let Some(key) = non_empty_env(TTS_API_KEY_ENV_VAR) {
            self.tts.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.generation.concurrency == 0 {
            return Err(Error::Config(
                "generation.concurrency must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.multiplier < 1.0 {
            return Err(Error::Config(
                "retry.multiplier must be at least 1.0".to_string(),
            ));
        }
        let timeouts = [
            ("provider.timeout_ms", self.provider.timeout_ms),
            ("tts.timeout_ms", self.tts.timeout_ms),
            ("generation.deadline_ms", self.generation.deadline_ms),
            (
                "generation.transcription_deadline_ms",
                self.generation.transcription_deadline_ms,
            ),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than 0", name)));
            }
        }
        if self.provider.requests_per_second == Some(0) {
            return Err(Error::Config(
                "provider.requests_per_second must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration file path following the priority order above
///
/// Returns `None` only when no CLI argument or env var is given and the
/// platform has no configuration directory.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Some(path) = non_empty_env(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: platform config directory
    default_config_path()
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("evai").join("config.toml"))
}

/// OS-dependent default directory for synthesized audio
pub fn default_audio_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("evai").join("audio"))
        .unwrap_or_else(|| PathBuf::from("./evai_data/audio"))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
