//! Response types and error-body decoding.

use super::version::{ApiVersion, OUTPUT_SAMPLE_RATE};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Audio returned by a successful synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOutput {
    pub data: Bytes,
    pub format: AudioFormat,
    /// `Content-Type` header as sent by the service.
    pub content_type: Option<String>,
}

impl AudioOutput {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        OUTPUT_SAMPLE_RATE
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

/// Audio container formats the service may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Flac,
    Unknown,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// The service documents `audio/wav`; a missing header is treated as WAV.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(ct) = content_type else {
            return Self::Wav;
        };
        let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Self::Wav,
            "audio/mpeg" | "audio/mp3" => Self::Mp3,
            "audio/ogg" => Self::Ogg,
            "audio/flac" | "audio/x-flac" => Self::Flac,
            _ => Self::Unknown,
        }
    }
}

/// Pull the human-readable message out of an error body.
///
/// Reads the version's error field (`detail` or `error`). String values are returned as-is;
/// structured values are rendered as JSON. Bodies that are not JSON, or lack the field, are
/// returned verbatim.
pub fn error_message(version: ApiVersion, body: &[u8]) -> String {
    let field = version.limits().error_field;
    let raw = String::from_utf8_lossy(body);
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) else {
        return raw.into_owned();
    };
    match json.get(field) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => raw.into_owned(),
        Some(other) => other.to_string(),
    }
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, alias = "ts", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}

/// Payload of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<serde_json::Value>,
}

/// A registered voice, as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, alias = "blob_url")]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl VoiceRecord {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Payload of `GET /voices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceList {
    #[serde(default)]
    pub voices: Vec<VoiceRecord>,
    /// Set by the service when voice storage is not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
