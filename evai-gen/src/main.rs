//! evai-gen - accessibility variant generation and speech assessment CLI
//!
//! Subcommands:
//! - `generate`: adapt one lesson for a set of accessibility categories
//! - `assess`: transcribe, score and adjust one recorded answer
//! - `policies`: print the deployed policy table

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evai_common::config::{resolve_config_path, EvaiConfig};
use evai_common::{AccessibilityCategory, PolicyTable, PreferenceSet};
use evai_gen::audio::AudioClip;
use evai_gen::speech::{AssessmentMode, AssessmentOptions, SpeechSubmission};
use evai_gen::variants::VariantRequest;
use evai_gen::{BackendClient, FsAudioStore, SpeechPipeline, VariantOrchestrator};
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "evai-gen")]
#[command(about = "Accessibility variant generation and speech assessment")]
#[command(version)]
struct Args {
    /// Configuration file (overrides EVAI_CONFIG and the default location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate adapted variants of one lesson and print the report as JSON
    Generate {
        /// Request as a JSON file path or an inline JSON object
        #[arg(short, long)]
        request: String,

        /// Overrides generation.deadline_ms
        #[arg(long, env = "EVAI_DEADLINE_MS")]
        deadline_ms: Option<u64>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Assess one recorded answer and print the result as JSON
    Assess {
        /// Recorded audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Accessibility category of the student
        #[arg(long, default_value = "general")]
        category: AccessibilityCategory,

        #[arg(short, long, default_value = "read-aloud")]
        mode: AssessmentMode,

        /// Preference set as a JSON file path or an inline JSON object
        #[arg(short, long)]
        preferences: Option<String>,

        /// Run the fairness normalization pass
        #[arg(long)]
        normalize: bool,

        /// Synthesize spoken feedback
        #[arg(long)]
        spoken_feedback: bool,

        #[arg(long)]
        session_id: Option<Uuid>,
    },

    /// Print the policy table summary
    Policies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = EvaiConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = evai_gen::GIT_HASH,
        build_timestamp = evai_gen::BUILD_TIMESTAMP,
        profile = evai_gen::BUILD_PROFILE,
        "Starting evai-gen"
    );
    match resolve_config_path(args.config.as_deref()) {
        Some(path) if path.exists() => info!(path = %path.display(), "Configuration loaded"),
        _ => info!("Using compiled default configuration"),
    }

    let policies = Arc::new(PolicyTable::builtin());
    policies
        .validate_complete()
        .context("Built-in policy table is incomplete")?;

    match args.command {
        Command::Generate {
            request,
            deadline_ms,
            out,
        } => run_generate(&config, policies, &request, deadline_ms, out.as_deref()).await,
        Command::Assess {
            audio,
            category,
            mode,
            preferences,
            normalize,
            spoken_feedback,
            session_id,
        } => {
            let preferences = match preferences {
                Some(raw) => read_json_arg::<PreferenceSet>(&raw).context("Invalid --preferences")?,
                None => PreferenceSet::default(),
            };
            let bytes = tokio::fs::read(&audio)
                .await
                .with_context(|| format!("Failed to read audio file {}", audio.display()))?;
            let filename = audio.file_name().and_then(|n| n.to_str());
            let submission = SpeechSubmission {
                session_id: session_id.unwrap_or_else(Uuid::new_v4),
                audio: AudioClip::detect(bytes, filename),
                mode,
                category,
                accessibility_context: preferences,
            };
            let options = AssessmentOptions {
                normalize,
                spoken_feedback,
                deadline: Some(
                    tokio::time::Instant::now()
                        + Duration::from_millis(config.generation.transcription_deadline_ms),
                ),
            };
            run_assess(&config, policies, submission, options).await
        }
        Command::Policies => print_policies(&policies),
    }
}

async fn run_generate(
    config: &EvaiConfig,
    policies: Arc<PolicyTable>,
    raw_request: &str,
    deadline_ms: Option<u64>,
    out: Option<&Path>,
) -> Result<()> {
    let request: VariantRequest = read_json_arg(raw_request).context("Invalid --request")?;
    let backend = Arc::new(BackendClient::from_config(config).context("Failed to build backend client")?);
    let store = Arc::new(FsAudioStore::new(
        config.storage.resolved_audio_dir(),
        config.storage.public_base_url.clone(),
    ));

    let orchestrator =
        VariantOrchestrator::new(backend, policies, store).with_config(&config.generation);
    let deadline = tokio::time::Instant::now()
        + Duration::from_millis(deadline_ms.unwrap_or(config.generation.deadline_ms));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, cancelling generation");
            ctrl_c.cancel();
        }
    });

    let report = orchestrator
        .generate_variants_cancellable(&request, deadline, &cancel)
        .await
        .context("Variant generation rejected")?;

    write_json(&report, out).await
}

async fn run_assess(
    config: &EvaiConfig,
    policies: Arc<PolicyTable>,
    submission: SpeechSubmission,
    options: AssessmentOptions,
) -> Result<()> {
    let backend = Arc::new(BackendClient::from_config(config).context("Failed to build backend client")?);
    let store = Arc::new(FsAudioStore::new(
        config.storage.resolved_audio_dir(),
        config.storage.public_base_url.clone(),
    ));

    let pipeline = SpeechPipeline::new(backend, policies, store)
        .with_concurrency(config.generation.concurrency);
    let result = pipeline
        .assess(submission, options)
        .await
        .context("Assessment failed")?;

    write_json(&result, None).await
}

fn print_policies(policies: &PolicyTable) -> Result<()> {
    println!(
        "{:<14} {:<9} {:<8} {:<22} {}",
        "CATEGORY", "VOICE", "NARRATE", "REQUIRED EXTRAS", "SCORING ADJUSTMENTS"
    );
    for policy in policies.policies() {
        let extras: Vec<&str> = policy
            .required_fields
            .iter()
            .map(String::as_str)
            .filter(|f| !matches!(*f, "passage" | "questions"))
            .collect();
        let rules: Vec<String> = policy
            .scoring_adjustments
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{:<14} {:<9} {:<8} {:<22} {}",
            policy.category.as_str(),
            policy.voice_style.to_string(),
            if policy.narrate { "yes" } else { "no" },
            if extras.is_empty() { "-".to_string() } else { extras.join(",") },
            if rules.is_empty() { "-".to_string() } else { rules.join(", ") },
        );
    }
    Ok(())
}

/// Parse an argument that is either inline JSON or a path to a JSON file
fn read_json_arg<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    let trimmed = raw.trim_start();
    let content = if trimmed.starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw).with_context(|| format!("Failed to read {}", raw))?
    };
    serde_json::from_str(&content).context("Malformed JSON")
}

async fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match out {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_assess() {
        let args = Args::try_parse_from([
            "evai-gen",
            "assess",
            "--audio",
            "answer.webm",
            "--category",
            "stammering",
            "--mode",
            "mock_interview",
            "--normalize",
        ])
        .unwrap();
        match args.command {
            Command::Assess {
                category,
                mode,
                normalize,
                spoken_feedback,
                ..
            } => {
                assert_eq!(category, AccessibilityCategory::Speech);
                assert_eq!(mode, AssessmentMode::MockInterview);
                assert!(normalize);
                assert!(!spoken_feedback);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_read_json_arg_inline() {
        let prefs: PreferenceSet = read_json_arg(r#"{"stammer_friendly": true}"#).unwrap();
        assert!(prefs.stammer_friendly);
    }

    #[test]
    fn test_read_json_arg_missing_file() {
        let result: Result<PreferenceSet> = read_json_arg("/nonexistent/prefs.json");
        assert!(result.is_err());
    }
}
