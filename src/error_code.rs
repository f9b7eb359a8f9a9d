//! 标准错误码：为每类客户端错误提供稳定的编码与分类。
//!
//! Stable error codes for the Echo-TTS client.
//!
//! Every [`crate::Error`] maps to one code. Codes are stable across releases so
//! applications can match on them in logs and exit statuses.
//!
//! | Prefix | Category    | Description                         |
//! |--------|-------------|-------------------------------------|
//! | E1xxx  | client      | Rejected locally or by the service  |
//! | E3xxx  | server      | Service-side failures               |
//! | E4xxx  | operational | Timeouts, cancellation, transport   |
//! | E9xxx  | unknown     | Catch-all / unclassified            |
//!
//! ## Example
//!
//! ```rust
//! use echo_tts_client::error_code::ErrorCode;
//!
//! let code = ErrorCode::from_http_status(401);
//! assert_eq!(code.code(), "E1003");
//! assert_eq!(code.category(), "client");
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// E1001: Request failed local validation
    InvalidParameter,
    /// E1002: Service rejected the request body (HTTP 400)
    BadRequest,
    /// E1003: Invalid or missing API key (HTTP 401)
    Unauthorized,
    /// E1004: Voice or endpoint does not exist (HTTP 404)
    NotFound,
    /// E1005: State conflict, e.g. a voice id already registered (HTTP 409)
    Conflict,
    /// E1006: Operation not offered by the selected contract version
    Unsupported,
    /// E1007: Client could not be configured
    Configuration,
    /// E3001: Internal error on the service side (HTTP 5xx)
    ServerError,
    /// E3002: Service dependency not available (HTTP 503)
    Unavailable,
    /// E4001: Request exceeded the configured timeout on the client side
    Timeout,
    /// E4002: Request was cancelled by the caller
    Cancelled,
    /// E4003: Connection-level failure
    Transport,
    /// E9999: Error could not be classified
    Unknown,
}

impl ErrorCode {
    /// Returns the canonical code string (e.g., `"E1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "E1001",
            Self::BadRequest => "E1002",
            Self::Unauthorized => "E1003",
            Self::NotFound => "E1004",
            Self::Conflict => "E1005",
            Self::Unsupported => "E1006",
            Self::Configuration => "E1007",
            Self::ServerError => "E3001",
            Self::Unavailable => "E3002",
            Self::Timeout => "E4001",
            Self::Cancelled => "E4002",
            Self::Transport => "E4003",
            Self::Unknown => "E9999",
        }
    }

    /// Returns the snake_case name (e.g., `"invalid_parameter"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::Configuration => "configuration",
            Self::ServerError => "server_error",
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Transport => "transport",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the category: `"client"`, `"server"`, `"operational"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidParameter
            | Self::BadRequest
            | Self::Unauthorized
            | Self::NotFound
            | Self::Conflict
            | Self::Unsupported
            | Self::Configuration => "client",
            Self::ServerError | Self::Unavailable => "server",
            Self::Timeout | Self::Cancelled | Self::Transport => "operational",
            Self::Unknown => "unknown",
        }
    }

    /// Maps an HTTP status code to the most likely `ErrorCode`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::BadRequest,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            409 => Self::Conflict,
            503 => Self::Unavailable,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
