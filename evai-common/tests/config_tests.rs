//! Configuration resolution and graceful degradation
//!
//! Uses serial_test to prevent environment variable races: every test that
//! touches EVAI_* variables is marked #[serial].

use evai_common::config::{
    resolve_config_path, EvaiConfig, CONFIG_ENV_VAR, PROVIDER_API_KEY_ENV_VAR,
    TTS_API_KEY_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(PROVIDER_API_KEY_ENV_VAR);
    env::remove_var(TTS_API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    clear_env();
    env::set_var(CONFIG_ENV_VAR, "/tmp/evai-env-config.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/evai-env-config.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    clear_env();
    env::set_var(CONFIG_ENV_VAR, "/tmp/evai-env-config.toml");

    let cli = PathBuf::from("/tmp/evai-cli-config.toml");
    assert_eq!(resolve_config_path(Some(&cli)), Some(cli.clone()));

    clear_env();
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config = EvaiConfig::load(Some(&missing)).unwrap();
    assert_eq!(config, EvaiConfig::default());
}

#[test]
#[serial]
fn test_load_reads_file_sections() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[provider]
model = "local/test-model"
requests_per_second = 5

[generation]
concurrency = 2
deadline_ms = 500

[storage]
audio_dir = "/tmp/evai-audio"
"#
    )
    .unwrap();

    let config = EvaiConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.provider.model, "local/test-model");
    assert_eq!(config.provider.requests_per_second, Some(5));
    assert_eq!(config.generation.concurrency, 2);
    assert_eq!(config.generation.deadline_ms, 500);
    assert_eq!(
        config.storage.resolved_audio_dir(),
        PathBuf::from("/tmp/evai-audio")
    );
    // Untouched sections keep compiled defaults
    assert_eq!(config.retry.max_attempts, 3);
}

#[test]
#[serial]
fn test_env_secrets_override_toml() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[provider]
api_key = "from-toml"

[tts]
api_key = "tts-from-toml"
"#
    )
    .unwrap();

    env::set_var(PROVIDER_API_KEY_ENV_VAR, "from-env");
    let config = EvaiConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.provider.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.tts.api_key.as_deref(), Some("tts-from-toml"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_fail_load() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[retry]\nmax_attempts = 0").unwrap();

    let err = EvaiConfig::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("max_attempts"));
}
