//! Echo-TTS client.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod error_classification;
mod voices;

pub use builder::TtsClientBuilder;
pub use core::TtsClient;
