use crate::error_code::ErrorCode;
use std::time::Duration;
use thiserror::Error;

/// Structured error context for local failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Request field or configuration key that caused the error (e.g., "num_steps", "config.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., accepted range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "validate", "client_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the Echo-TTS client.
///
/// Local failures (`InvalidParameter`, `UnsupportedOperation`, `Configuration`) never reach
/// the network. Remote failures carry the message the service returned, unchanged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid parameter: {message}{}", format_context(.context))]
    InvalidParameter {
        message: String,
        context: ErrorContext,
    },

    #[error("Bad request (HTTP 400): {message}")]
    BadRequest { message: String },

    #[error("Unauthorized (HTTP 401): {message}")]
    Unauthorized { message: String },

    #[error("Not found (HTTP 404): {message}")]
    NotFound { message: String },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Request timed out after {}s", .timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create an invalid-parameter error for a request field.
    pub fn invalid_parameter(field: &str, msg: impl Into<String>) -> Self {
        Error::InvalidParameter {
            message: msg.into(),
            context: ErrorContext::new()
                .with_field_path(field)
                .with_source("validate"),
        }
    }

    /// Create a new invalid-parameter error with structured context
    pub fn invalid_parameter_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidParameter {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            message: msg.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidParameter { context, .. } | Error::Configuration { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// The message returned by the remote service, for errors that carry one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Error::BadRequest { message }
            | Error::Unauthorized { message }
            | Error::NotFound { message }
            | Error::ServerError { message, .. }
            | Error::Remote { message, .. } => Some(message),
            _ => None,
        }
    }

    /// HTTP status of a remote failure.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::BadRequest { .. } => Some(400),
            Error::Unauthorized { .. } => Some(401),
            Error::NotFound { .. } => Some(404),
            Error::ServerError { status, .. } | Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Error::BadRequest { .. } => ErrorCode::BadRequest,
            Error::Unauthorized { .. } => ErrorCode::Unauthorized,
            Error::NotFound { .. } => ErrorCode::NotFound,
            Error::ServerError { status, .. } => ErrorCode::from_http_status(*status),
            Error::Remote { status, .. } => ErrorCode::from_http_status(*status),
            Error::Timeout { .. } => ErrorCode::Timeout,
            Error::Cancelled => ErrorCode::Cancelled,
            Error::Transport(_) => ErrorCode::Transport,
            Error::UnsupportedOperation { .. } => ErrorCode::Unsupported,
            Error::Configuration { .. } => ErrorCode::Configuration,
            Error::Serialization(_) | Error::Io(_) => ErrorCode::Unknown,
        }
    }

    /// True when the request never left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::InvalidParameter { .. }
                | Error::UnsupportedOperation { .. }
                | Error::Configuration { .. }
        )
    }
}
