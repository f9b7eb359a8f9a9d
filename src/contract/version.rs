//! Contract versions and their documented limits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

/// The two published, mutually incompatible versions of the Echo-TTS API.
///
/// They are kept distinct rather than reconciled: parameter names, ranges, and
/// error shapes differ, and neither is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiVersion {
    /// Version A: speaker given by `speaker_audio_url`, guidance `cfg_scale_speaker`,
    /// errors under `detail`.
    SpeakerUrl,
    /// Version B: speaker given by a registered `voice_id`, guidance `speaker_kv_scale`,
    /// errors under `error`.
    VoiceId,
}

/// Parameter names, bounds, and defaults for one contract version.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractLimits {
    pub num_steps: RangeInclusive<u32>,
    pub default_num_steps: u32,
    pub guidance_field: &'static str,
    pub guidance: RangeInclusive<f64>,
    pub default_guidance: f64,
    pub inline_audio_field: &'static str,
    pub error_field: &'static str,
    pub timeout_ceiling: Duration,
}

pub const DEFAULT_RNG_SEED: i64 = 0;
pub const DEFAULT_PRESET_NAME: &str = "Independent (High Speaker CFG)";
pub const DEFAULT_SPEAKER_KV_ENABLE: bool = true;

/// Sample rate of audio produced by the service.
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;

impl ApiVersion {
    pub fn limits(&self) -> ContractLimits {
        match self {
            Self::SpeakerUrl => ContractLimits {
                num_steps: 16..=48,
                default_num_steps: 24,
                guidance_field: "cfg_scale_speaker",
                guidance: 1.0..=15.0,
                default_guidance: 8.0,
                inline_audio_field: "audio_base64",
                error_field: "detail",
                timeout_ceiling: Duration::from_secs(600),
            },
            Self::VoiceId => ContractLimits {
                num_steps: 1..=80,
                default_num_steps: 40,
                guidance_field: "speaker_kv_scale",
                guidance: 1.0..=2.0,
                default_guidance: 1.5,
                inline_audio_field: "audio",
                error_field: "error",
                timeout_ceiling: Duration::from_secs(300),
            },
        }
    }

    /// Whether the registered-voice endpoints exist on this version.
    pub fn supports_voice_registry(&self) -> bool {
        matches!(self, Self::VoiceId)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeakerUrl => "speaker-url",
            Self::VoiceId => "voice-id",
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::SpeakerUrl
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "speaker-url" | "speaker_url" | "a" => Ok(Self::SpeakerUrl),
            "voice-id" | "voice_id" | "b" => Ok(Self::VoiceId),
            other => Err(crate::Error::configuration(format!(
                "unknown API version '{}' (expected 'speaker-url' or 'voice-id')",
                other
            ))),
        }
    }
}
