//! HTTP transport for the Echo-TTS service.

mod http;

pub use http::{
    AuthScheme, HttpTransport, TransportError, TransportSettings, API_KEY_HEADER,
    REQUEST_ID_HEADER,
};
