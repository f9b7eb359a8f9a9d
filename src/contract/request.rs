//! Synthesis request model and local validation.
//!
//! A [`SynthesisRequest`] is what callers build; [`SynthesisRequest::validate`] turns it into a
//! [`ValidatedRequest`] with every default made explicit. Only validated requests are encoded
//! for the wire.

use super::version::{
    ApiVersion, DEFAULT_PRESET_NAME, DEFAULT_RNG_SEED, DEFAULT_SPEAKER_KV_ENABLE,
};
use crate::{Error, ErrorContext, Result};
use base64::Engine as _;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};

/// Tag prepended to text that does not name a speaker.
pub const DEFAULT_SPEAKER_TAG: &str = "[S1] ";

/// File name used for inline speaker audio in multipart bodies.
const INLINE_AUDIO_FILE_NAME: &str = "speaker.wav";
const INLINE_AUDIO_MIME: &str = "audio/wav";

/// Parameters for one synthesis call.
///
/// Exactly one of `speaker_audio_url`, `voice_id`, and `speaker_audio` must be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker_audio_url: Option<String>,
    pub voice_id: Option<String>,
    pub speaker_audio: Option<Bytes>,
    pub num_steps: Option<u32>,
    pub rng_seed: Option<i64>,
    /// `cfg_scale_speaker` on the speaker-url contract, `speaker_kv_scale` on the voice-id contract.
    pub guidance_scale: Option<f64>,
    pub speaker_kv_enable: Option<bool>,
    pub preset_name: Option<String>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_speaker_audio_url(mut self, url: impl Into<String>) -> Self {
        self.speaker_audio_url = Some(url.into());
        self
    }

    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// Reference audio sent inline with the request.
    pub fn with_speaker_audio(mut self, audio: impl Into<Bytes>) -> Self {
        self.speaker_audio = Some(audio.into());
        self
    }

    pub fn with_num_steps(mut self, num_steps: u32) -> Self {
        self.num_steps = Some(num_steps);
        self
    }

    pub fn with_rng_seed(mut self, seed: i64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = Some(scale);
        self
    }

    pub fn with_speaker_kv_enable(mut self, enable: bool) -> Self {
        self.speaker_kv_enable = Some(enable);
        self
    }

    pub fn with_preset_name(mut self, preset: impl Into<String>) -> Self {
        self.preset_name = Some(preset.into());
        self
    }

    /// Check the request against `version`'s documented constraints and apply defaults.
    pub fn validate(&self, version: ApiVersion) -> Result<ValidatedRequest> {
        validate(self, version)
    }
}

/// How the speaker voice is identified on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeakerReference {
    AudioUrl(String),
    VoiceId(String),
    InlineAudio(Bytes),
}

impl SpeakerReference {
    fn kind(&self) -> &'static str {
        match self {
            Self::AudioUrl(_) => "speaker_audio_url",
            Self::VoiceId(_) => "voice_id",
            Self::InlineAudio(_) => "inline_audio",
        }
    }
}

/// A request that passed validation, with all defaults resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    version: ApiVersion,
    text: String,
    speaker: SpeakerReference,
    num_steps: u32,
    rng_seed: i64,
    guidance_scale: f64,
    speaker_kv_enable: Option<bool>,
    preset_name: Option<String>,
}

impl ValidatedRequest {
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Text as it will be sent, speaker tag included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn speaker(&self) -> &SpeakerReference {
        &self.speaker
    }

    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    pub fn rng_seed(&self) -> i64 {
        self.rng_seed
    }

    pub fn guidance_scale(&self) -> f64 {
        self.guidance_scale
    }

    pub fn speaker_kv_enable(&self) -> Option<bool> {
        self.speaker_kv_enable
    }

    pub fn preset_name(&self) -> Option<&str> {
        self.preset_name.as_deref()
    }

    pub(crate) fn speaker_kind(&self) -> &'static str {
        self.speaker.kind()
    }

    /// Encode as a JSON body using the version's field names.
    pub fn to_json(&self) -> Value {
        let limits = self.version.limits();
        let mut body = json!({
            "text": self.text,
            "num_steps": self.num_steps,
            "rng_seed": self.rng_seed,
        });
        body[limits.guidance_field] = json!(self.guidance_scale);
        match &self.speaker {
            SpeakerReference::AudioUrl(url) => {
                body["speaker_audio_url"] = Value::String(url.clone());
            }
            SpeakerReference::VoiceId(id) => {
                body["voice_id"] = Value::String(id.clone());
            }
            SpeakerReference::InlineAudio(audio) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(audio);
                body[limits.inline_audio_field] = Value::String(encoded);
            }
        }
        if let Some(enable) = self.speaker_kv_enable {
            body["speaker_kv_enable"] = Value::Bool(enable);
        }
        if let Some(preset) = &self.preset_name {
            body["preset_name"] = Value::String(preset.clone());
        }
        body
    }

    /// Encode as a multipart form; inline audio travels as a file part named `audio`.
    pub fn to_multipart(&self) -> reqwest::multipart::Form {
        let limits = self.version.limits();
        let mut form = reqwest::multipart::Form::new()
            .text("text", self.text.clone())
            .text("num_steps", self.num_steps.to_string())
            .text("rng_seed", self.rng_seed.to_string())
            .text(limits.guidance_field, self.guidance_scale.to_string());
        form = match &self.speaker {
            SpeakerReference::AudioUrl(url) => form.text("speaker_audio_url", url.clone()),
            SpeakerReference::VoiceId(id) => form.text("voice_id", id.clone()),
            SpeakerReference::InlineAudio(audio) => {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(INLINE_AUDIO_MIME));
                let part = reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name(INLINE_AUDIO_FILE_NAME)
                    .headers(headers);
                form.part("audio", part)
            }
        };
        if let Some(enable) = self.speaker_kv_enable {
            form = form.text("speaker_kv_enable", enable.to_string());
        }
        if let Some(preset) = &self.preset_name {
            form = form.text("preset_name", preset.clone());
        }
        form
    }
}

/// True when `text` already starts with a speaker tag such as `[S1]` or `[S2]`.
pub fn has_speaker_tag(text: &str) -> bool {
    text.trim_start().starts_with("[S")
}

/// Prefix `text` with [`DEFAULT_SPEAKER_TAG`] unless it already names a speaker.
pub fn apply_speaker_tag(text: &str) -> String {
    if has_speaker_tag(text) {
        text.to_string()
    } else {
        format!("{}{}", DEFAULT_SPEAKER_TAG, text)
    }
}

/// Validate `request` against `version` without touching the network.
pub fn validate(request: &SynthesisRequest, version: ApiVersion) -> Result<ValidatedRequest> {
    let limits = version.limits();

    if request.text.trim().is_empty() {
        return Err(Error::invalid_parameter("text", "text must not be empty"));
    }

    let speaker = resolve_speaker(request, version)?;

    let num_steps = request.num_steps.unwrap_or(limits.default_num_steps);
    if !limits.num_steps.contains(&num_steps) {
        return Err(Error::invalid_parameter_with_context(
            format!(
                "num_steps must be between {} and {}, got {}",
                limits.num_steps.start(),
                limits.num_steps.end(),
                num_steps
            ),
            ErrorContext::new()
                .with_field_path("num_steps")
                .with_details(format!("contract: {}", version))
                .with_source("validate"),
        ));
    }

    let guidance_scale = request.guidance_scale.unwrap_or(limits.default_guidance);
    if !guidance_scale.is_finite() || !limits.guidance.contains(&guidance_scale) {
        return Err(Error::invalid_parameter_with_context(
            format!(
                "{} must be between {} and {}, got {}",
                limits.guidance_field,
                limits.guidance.start(),
                limits.guidance.end(),
                guidance_scale
            ),
            ErrorContext::new()
                .with_field_path(limits.guidance_field)
                .with_details(format!("contract: {}", version))
                .with_source("validate"),
        ));
    }

    let (speaker_kv_enable, preset_name) = match version {
        ApiVersion::SpeakerUrl => {
            if request.speaker_kv_enable.is_some() {
                return Err(unsupported_field("speaker_kv_enable", version));
            }
            if request.preset_name.is_some() {
                return Err(unsupported_field("preset_name", version));
            }
            (None, None)
        }
        ApiVersion::VoiceId => {
            let preset = match request.preset_name.as_deref() {
                Some(p) if p.trim().is_empty() => {
                    return Err(Error::invalid_parameter(
                        "preset_name",
                        "preset_name must not be blank",
                    ));
                }
                Some(p) => p.to_string(),
                None => DEFAULT_PRESET_NAME.to_string(),
            };
            (
                Some(request.speaker_kv_enable.unwrap_or(DEFAULT_SPEAKER_KV_ENABLE)),
                Some(preset),
            )
        }
    };

    Ok(ValidatedRequest {
        version,
        text: apply_speaker_tag(&request.text),
        speaker,
        num_steps,
        rng_seed: request.rng_seed.unwrap_or(DEFAULT_RNG_SEED),
        guidance_scale,
        speaker_kv_enable,
        preset_name,
    })
}

fn resolve_speaker(request: &SynthesisRequest, version: ApiVersion) -> Result<SpeakerReference> {
    match (
        &request.speaker_audio_url,
        &request.voice_id,
        &request.speaker_audio,
    ) {
        (Some(url), None, None) => {
            if version != ApiVersion::SpeakerUrl {
                return Err(unsupported_field("speaker_audio_url", version));
            }
            let parsed = url::Url::parse(url).map_err(|e| {
                Error::invalid_parameter(
                    "speaker_audio_url",
                    format!("invalid URL '{}': {}", url, e),
                )
            })?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(Error::invalid_parameter(
                    "speaker_audio_url",
                    format!("speaker_audio_url must be an http(s) URL, got '{}'", url),
                ));
            }
            Ok(SpeakerReference::AudioUrl(url.clone()))
        }
        (None, Some(id), None) => {
            if version != ApiVersion::VoiceId {
                return Err(unsupported_field("voice_id", version));
            }
            check_voice_id(id)?;
            Ok(SpeakerReference::VoiceId(id.clone()))
        }
        (None, None, Some(audio)) => {
            if audio.is_empty() {
                return Err(Error::invalid_parameter(
                    "speaker_audio",
                    "inline speaker audio must not be empty",
                ));
            }
            Ok(SpeakerReference::InlineAudio(audio.clone()))
        }
        (None, None, None) => {
            let expected = match version {
                ApiVersion::SpeakerUrl => "speaker_audio_url or inline speaker audio",
                ApiVersion::VoiceId => "voice_id or inline speaker audio",
            };
            Err(Error::invalid_parameter(
                "speaker",
                format!("a speaker reference is required ({})", expected),
            ))
        }
        _ => Err(Error::invalid_parameter(
            "speaker",
            "exactly one speaker reference may be set",
        )),
    }
}

/// Voice ids are path segments on the service: ASCII letters, digits, `-` and `_` only.
pub(crate) fn check_voice_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_parameter("voice_id", "voice_id must not be empty"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::invalid_parameter(
            "voice_id",
            format!(
                "voice_id '{}' may only contain ASCII letters, digits, '-' and '_'",
                id
            ),
        ));
    }
    Ok(())
}

fn unsupported_field(field: &str, version: ApiVersion) -> Error {
    Error::invalid_parameter_with_context(
        format!("{} is not part of the {} contract", field, version),
        ErrorContext::new()
            .with_field_path(field)
            .with_source("validate"),
    )
}
