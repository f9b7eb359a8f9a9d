use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::{Method, Proxy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Header carrying our per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Alternative auth header accepted by the service.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Where the API key goes on outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    #[default]
    Bearer,
    /// `X-API-Key: <key>`
    ApiKeyHeader,
}

impl FromStr for AuthScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "api-key-header" | "x-api-key" | "api_key_header" => Ok(Self::ApiKeyHeader),
            other => Err(Error::configuration(format!(
                "unknown auth scheme '{}' (expected 'bearer' or 'api-key-header')",
                other
            ))),
        }
    }
}

/// Settings the transport needs; assembled by the client builder.
#[derive(Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub path_prefix: String,
    pub api_key: String,
    pub auth_scheme: AuthScheme,
    pub timeout: Duration,
    pub proxy_url: Option<String>,
}

/// Thin reqwest wrapper: URL assembly, auth, request ids, and error mapping.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    path_prefix: String,
    api_key: String,
    auth_scheme: AuthScheme,
    timeout: Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("path_prefix", &self.path_prefix)
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let base = url::Url::parse(&settings.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}': {}", settings.base_url, e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("transport"),
            )
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("base URL must use http or https, got '{}'", base.scheme()),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("transport"),
            ));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout.min(Duration::from_secs(30)))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &settings.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL '{}': {}", proxy_url, e),
                    ErrorContext::new()
                        .with_field_path("proxy_url")
                        .with_source("transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            path_prefix: settings.path_prefix,
            api_key: settings.api_key,
            auth_scheme: settings.auth_scheme,
            timeout: settings.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for an endpoint path such as `/tts`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.path_prefix, path)
    }

    /// Absolute URL for a path served at the service root, ignoring the path prefix.
    pub fn root_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with auth and a fresh request id attached.
    pub fn request(&self, method: Method, path: &str) -> (reqwest::RequestBuilder, String) {
        self.request_url(method, self.url(path))
    }

    /// Like [`HttpTransport::request`], for paths that live outside the prefix.
    pub fn root_request(&self, method: Method, path: &str) -> (reqwest::RequestBuilder, String) {
        self.request_url(method, self.root_url(path))
    }

    fn request_url(&self, method: Method, url: String) -> (reqwest::RequestBuilder, String) {
        let request_id = Uuid::new_v4().to_string();
        debug!(
            method = method.as_str(),
            url = url.as_str(),
            request_id = request_id.as_str(),
            "echo-tts request"
        );
        let mut req = self
            .client
            .request(method, &url)
            .header(REQUEST_ID_HEADER, &request_id);
        req = match self.auth_scheme {
            AuthScheme::Bearer => req.bearer_auth(&self.api_key),
            AuthScheme::ApiKeyHeader => req.header(API_KEY_HEADER, &self.api_key),
        };
        (req, request_id)
    }

    /// Send a prepared request. Exactly one attempt is made.
    pub async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        req.send().await.map_err(|e| self.map_error(e))
    }

    /// Read the full response body.
    pub async fn read_body(&self, resp: reqwest::Response) -> Result<Bytes> {
        resp.bytes().await.map_err(|e| self.map_error(e))
    }

    fn map_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout: self.timeout,
            }
        } else {
            Error::Transport(TransportError::Http(e))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str, prefix: &str) -> TransportSettings {
        TransportSettings {
            base_url: base_url.to_string(),
            path_prefix: prefix.to_string(),
            api_key: "k".to_string(),
            auth_scheme: AuthScheme::Bearer,
            timeout: Duration::from_secs(5),
            proxy_url: None,
        }
    }

    #[test]
    fn url_joins_base_prefix_and_path() {
        let t = HttpTransport::new(settings("https://tts.example.com/", "/api")).unwrap();
        assert_eq!(t.url("/tts"), "https://tts.example.com/api/tts");
        assert_eq!(t.root_url("/"), "https://tts.example.com/");
        let t = HttpTransport::new(settings("http://127.0.0.1:8080", "")).unwrap();
        assert_eq!(t.url("/"), "http://127.0.0.1:8080/");
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(HttpTransport::new(settings("tts.example.com", "")).is_err());
        assert!(HttpTransport::new(settings("ftp://tts.example.com", "")).is_err());
    }

    #[test]
    fn auth_scheme_parsing() {
        assert_eq!("bearer".parse::<AuthScheme>().unwrap(), AuthScheme::Bearer);
        assert_eq!("X-API-Key".parse::<AuthScheme>().unwrap(), AuthScheme::ApiKeyHeader);
        assert!("basic".parse::<AuthScheme>().is_err());
    }
}
