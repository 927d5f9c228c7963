//! ElevenLabs-style text-to-speech provider

use super::error_for_response;
use crate::audio::AudioClip;
use crate::backend::SpeechProvider;
use crate::error::BackendError;
use async_trait::async_trait;
use evai_common::config::TtsConfig;
use evai_common::VoiceStyle;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl VoiceSettings {
    pub const STANDARD: VoiceSettings = VoiceSettings {
        stability: 0.5,
        similarity_boost: 0.75,
        style: 0.0,
        use_speaker_boost: true,
    };

    /// Steadier delivery for neurodivergent and AAC listeners
    pub const CALM: VoiceSettings = VoiceSettings {
        stability: 0.75,
        similarity_boost: 0.65,
        style: 0.0,
        use_speaker_boost: false,
    };

    pub fn for_style(style: VoiceStyle) -> Self {
        match style {
            VoiceStyle::Standard => Self::STANDARD,
            VoiceStyle::Calm | VoiceStyle::Aac => Self::CALM,
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model_id: String,
    voice_id: String,
    aac_voice_id: String,
}

impl ElevenLabsProvider {
    pub fn new(config: &TtsConfig) -> evai_common::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.saturating_mul(2)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| evai_common::Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            voice_id: config.voice_id.clone(),
            aac_voice_id: config.aac_voice_id.clone(),
        })
    }

    fn voice_id_for(&self, style: VoiceStyle) -> &str {
        match style {
            VoiceStyle::Aac => &self.aac_voice_id,
            VoiceStyle::Standard | VoiceStyle::Calm => &self.voice_id,
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn speak(&self, text: &str, voice: VoiceStyle) -> Result<AudioClip, BackendError> {
        let voice_id = self.voice_id_for(voice);
        let url = format!("{}/text-to-speech/{}", self.base_url, voice_id);
        let request = TtsRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings::for_style(voice),
        };

        let mut builder = self
            .client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("xi-api-key", key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("audio/"))
            .unwrap_or("audio/mpeg")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(BackendError::upstream("speech service returned no audio"));
        }

        tracing::debug!(
            voice_id,
            bytes = bytes.len(),
            "Speech synthesized"
        );
        Ok(AudioClip::new(bytes, mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_settings_per_style() {
        assert_eq!(VoiceSettings::for_style(VoiceStyle::Standard), VoiceSettings::STANDARD);
        assert_eq!(VoiceSettings::for_style(VoiceStyle::Calm), VoiceSettings::CALM);
        assert!(!VoiceSettings::for_style(VoiceStyle::Aac).use_speaker_boost);
    }

    #[test]
    fn test_aac_uses_dedicated_voice() {
        let provider = ElevenLabsProvider::new(&TtsConfig::default()).unwrap();
        assert_eq!(provider.voice_id_for(VoiceStyle::Aac), "AZnzlk1XvdvUeBnXmlld");
        assert_eq!(provider.voice_id_for(VoiceStyle::Calm), "21m00Tcm4TlvDq8ikWAM");
    }
}
