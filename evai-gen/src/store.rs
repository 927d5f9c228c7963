//! Audio store collaborators
//!
//! The core hands synthesized audio to an [`AudioStore`] and only keeps the
//! returned URL.

use crate::audio::AudioClip;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Persist `audio` under `key` (no extension) and return its URL
    async fn put(&self, key: &str, audio: &AudioClip) -> Result<String, StoreError>;
}

/// Reject empty, absolute and parent-relative keys
fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Store keeping clips in memory, used by tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryAudioStore {
    clips: Mutex<HashMap<String, AudioClip>>,
}

impl InMemoryAudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<AudioClip> {
        self.clips.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.clips.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AudioStore for InMemoryAudioStore {
    async fn put(&self, key: &str, audio: &AudioClip) -> Result<String, StoreError> {
        validate_key(key)?;
        let mut clips = self
            .clips
            .lock()
            .map_err(|_| StoreError::Io(std::io::Error::other("audio store lock poisoned")))?;
        clips.insert(key.to_string(), audio.clone());
        Ok(format!("memory://{}.{}", key, audio.extension()))
    }
}

/// Store writing clips below a directory
#[derive(Debug, Clone)]
pub struct FsAudioStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl FsAudioStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }
}

#[async_trait]
impl AudioStore for FsAudioStore {
    async fn put(&self, key: &str, audio: &AudioClip) -> Result<String, StoreError> {
        validate_key(key)?;
        let relative = format!("{}.{}", key, audio.extension());
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &audio.bytes).await?;

        tracing::debug!(
            path = %path.display(),
            bytes = audio.len(),
            "Stored audio clip"
        );

        Ok(match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), relative),
            None => format!("file://{}", path.display()),
        })
    }
}
