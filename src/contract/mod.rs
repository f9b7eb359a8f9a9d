//! 合成契约模块：API 版本、参数校验与响应类型。
//!
//! The Echo-TTS request/response contract: versions, request validation, and response types.

mod request;
mod response;
mod version;

pub use request::{
    apply_speaker_tag, has_speaker_tag, validate, SpeakerReference, SynthesisRequest,
    ValidatedRequest, DEFAULT_SPEAKER_TAG,
};
pub(crate) use request::check_voice_id;
pub use response::{
    error_message, AudioFormat, AudioOutput, HealthStatus, ServiceInfo, VoiceList, VoiceRecord,
};
pub use version::{
    ApiVersion, ContractLimits, DEFAULT_PRESET_NAME, DEFAULT_RNG_SEED, DEFAULT_SPEAKER_KV_ENABLE,
    OUTPUT_SAMPLE_RATE,
};
