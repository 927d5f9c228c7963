//! Audio clips and MIME detection
//!
//! The core never decodes audio; it only needs the byte payload and a MIME
//! type to hand to the transcription and storage collaborators.

use serde::Serialize;
use std::path::Path;

pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Extension → MIME type for accepted upload formats
const SUPPORTED_EXTENSIONS: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("webm", "audio/webm"),
    ("ogg", "audio/ogg"),
    ("m4a", "audio/mp4"),
    ("mp4", "audio/mp4"),
];

/// Encoded audio plus its MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioClip {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Build a clip, detecting the MIME type from `filename` and the bytes
    pub fn detect(bytes: Vec<u8>, filename: Option<&str>) -> Self {
        let mime_type = detect_mime_type(filename, &bytes).to_string();
        Self { bytes, mime_type }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the MIME type, without the dot
    pub fn extension(&self) -> &'static str {
        SUPPORTED_EXTENSIONS
            .iter()
            .find(|(_, mime)| *mime == self.mime_type)
            .map(|(ext, _)| *ext)
            .unwrap_or("mp3")
    }

    /// Short format name used by multimodal chat APIs (`wav`, `mp3`, ...)
    pub fn format(&self) -> &'static str {
        match self.extension() {
            "m4a" | "mp4" => "m4a",
            ext => ext,
        }
    }
}

/// MIME type from the file extension, falling back to sniffed content, then mp3
pub fn detect_mime_type(filename: Option<&str>, data: &[u8]) -> &'static str {
    if let Some(ext) = filename
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
    {
        let ext = ext.to_ascii_lowercase();
        if let Some((_, mime)) = SUPPORTED_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
            return mime;
        }
    }

    match infer::get(data).map(|kind| kind.mime_type()) {
        Some("audio/mpeg") => "audio/mpeg",
        Some("audio/x-wav") | Some("audio/wav") => "audio/wav",
        Some("audio/ogg") => "audio/ogg",
        Some("video/webm") => "audio/webm",
        Some("audio/m4a") | Some("video/mp4") => "audio/mp4",
        _ => DEFAULT_AUDIO_MIME,
    }
}
