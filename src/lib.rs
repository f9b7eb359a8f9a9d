//! # echo-tts-client
//!
//! Echo-TTS 托管语音合成服务的类型化客户端。
//!
//! Typed client for the hosted Echo-TTS text-to-speech service.
//!
//! ## Overview
//!
//! The service clones a voice from reference audio and speaks the given text. Inference,
//! voice storage, and authentication all live on the service; this crate reproduces its
//! request/response contract:
//!
//! - **Local validation**: parameter bounds, speaker-reference rules, and the default
//!   `[S1] ` speaker tag are applied before anything is sent
//! - **One call, one request**: no retries, no backoff; the caller decides what to do on failure
//! - **Classified errors**: 400/401/404/5xx, timeouts, and transport failures are distinct
//!   [`Error`] variants carrying the service's own message
//!
//! ## Contract versions
//!
//! Two incompatible versions of the API are published. [`ApiVersion::SpeakerUrl`] takes the
//! speaker as an audio URL and reports errors under `detail`; [`ApiVersion::VoiceId`] takes a
//! registered voice id and reports errors under `error`. Ranges and defaults differ too, see
//! [`ContractLimits`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use echo_tts_client::{ApiVersion, SynthesisRequest, TtsClient};
//!
//! #[tokio::main]
//! async fn main() -> echo_tts_client::Result<()> {
//!     let client = TtsClient::builder()
//!         .base_url("https://echo-tts.example.com")
//!         .api_key("your-api-key")
//!         .api_version(ApiVersion::SpeakerUrl)
//!         .build()?;
//!
//!     client.warmup().await?;
//!
//!     let request = SynthesisRequest::new("Hello from Echo-TTS.")
//!         .with_speaker_audio_url("https://example.com/reference.wav")
//!         .with_num_steps(32);
//!     let audio = client.synthesize(&request).await?;
//!     std::fs::write("output.wav", &audio.data)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`contract`] | Versions, limits, request validation, response types |
//! | [`client`] | [`TtsClient`] and its builder |
//! | [`config`] | Configuration from environment or YAML |
//! | [`transport`] | HTTP transport and auth |
//! | [`error_code`] | Stable error codes |

pub mod client;
pub mod config;
pub mod contract;
pub mod error_code;
pub mod transport;

// Re-export main types for convenience
pub use client::{TtsClient, TtsClientBuilder};
pub use config::{BodyEncoding, ClientConfig};
pub use contract::{
    validate, ApiVersion, AudioFormat, AudioOutput, ContractLimits, HealthStatus, ServiceInfo,
    SpeakerReference, SynthesisRequest, ValidatedRequest, VoiceList, VoiceRecord,
};
pub use tokio_util::sync::CancellationToken;
pub use transport::AuthScheme;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
