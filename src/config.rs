//! 客户端配置：从构建器、环境变量或 YAML 文件加载。
//!
//! Client configuration, loaded from builder calls, environment variables, or a YAML file.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ECHO_TTS_BASE_URL` | `base_url` |
//! | `API_KEY` | `api_key` |
//! | `ECHO_TTS_API_VERSION` | `api_version` (`speaker-url` / `voice-id`) |
//! | `ECHO_TTS_AUTH_SCHEME` | `auth_scheme` (`bearer` / `api-key-header`) |
//! | `ECHO_TTS_TIMEOUT_SECS` | `timeout_secs` |
//! | `ECHO_TTS_PATH_PREFIX` | `path_prefix` (e.g. `/api`) |
//! | `ECHO_TTS_PROXY_URL` | `proxy_url` |
//! | `ECHO_TTS_BODY_ENCODING` | `body_encoding` (`json` / `multipart`) |

use crate::contract::ApiVersion;
use crate::transport::AuthScheme;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "ECHO_TTS_BASE_URL";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_VERSION: &str = "ECHO_TTS_API_VERSION";
pub const ENV_AUTH_SCHEME: &str = "ECHO_TTS_AUTH_SCHEME";
pub const ENV_TIMEOUT_SECS: &str = "ECHO_TTS_TIMEOUT_SECS";
pub const ENV_PATH_PREFIX: &str = "ECHO_TTS_PATH_PREFIX";
pub const ENV_PROXY_URL: &str = "ECHO_TTS_PROXY_URL";
pub const ENV_BODY_ENCODING: &str = "ECHO_TTS_BODY_ENCODING";

/// Keyring service name consulted when no API key is configured.
pub const KEYRING_SERVICE: &str = "echo-tts";
const KEYRING_USER: &str = "api-key";

/// How the synthesis request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyEncoding {
    #[default]
    Json,
    Multipart,
}

impl FromStr for BodyEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "multipart" | "form" => Ok(Self::Multipart),
            other => Err(Error::configuration(format!(
                "unknown body encoding '{}' (expected 'json' or 'multipart')",
                other
            ))),
        }
    }
}

/// Client configuration. Unset fields fall back to their defaults only when the client is built,
/// so layers (file, environment) can be merged first.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_scheme: Option<AuthScheme>,
    /// Overrides the version's documented timeout ceiling.
    pub timeout_secs: Option<u64>,
    pub path_prefix: String,
    pub proxy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout_secs", &self.timeout_secs)
            .field("path_prefix", &self.path_prefix)
            .field("proxy_url", &self.proxy_url)
            .field("body_encoding", &self.body_encoding)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup (environment-shaped).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self {
            base_url: get(ENV_BASE_URL),
            api_key: get(ENV_API_KEY),
            path_prefix: get(ENV_PATH_PREFIX).unwrap_or_default(),
            proxy_url: get(ENV_PROXY_URL),
            ..Default::default()
        };
        if let Some(v) = get(ENV_API_VERSION) {
            cfg.api_version = Some(v.parse()?);
        }
        if let Some(v) = get(ENV_AUTH_SCHEME) {
            cfg.auth_scheme = Some(v.parse()?);
        }
        if let Some(v) = get(ENV_BODY_ENCODING) {
            cfg.body_encoding = Some(v.parse()?);
        }
        if let Some(v) = get(ENV_TIMEOUT_SECS) {
            let secs = v.trim().parse::<u64>().map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid timeout '{}': {}", v, e),
                    ErrorContext::new()
                        .with_field_path(ENV_TIMEOUT_SECS)
                        .with_source("config"),
                )
            })?;
            cfg.timeout_secs = Some(secs);
        }
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid YAML configuration: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(format!("file: {}", path.display())),
            },
            other => other,
        })
    }

    /// Fill unset fields from `other`.
    pub fn merge_missing(mut self, other: ClientConfig) -> Self {
        if self.base_url.is_none() {
            self.base_url = other.base_url;
        }
        if self.api_key.is_none() {
            self.api_key = other.api_key;
        }
        self.api_version = self.api_version.or(other.api_version);
        self.auth_scheme = self.auth_scheme.or(other.auth_scheme);
        self.body_encoding = self.body_encoding.or(other.body_encoding);
        if self.timeout_secs.is_none() {
            self.timeout_secs = other.timeout_secs;
        }
        if self.path_prefix.is_empty() {
            self.path_prefix = other.path_prefix;
        }
        if self.proxy_url.is_none() {
            self.proxy_url = other.proxy_url;
        }
        self
    }

    /// Contract version, defaulting to [`ApiVersion::SpeakerUrl`].
    pub fn effective_api_version(&self) -> ApiVersion {
        self.api_version.unwrap_or_default()
    }

    pub fn effective_auth_scheme(&self) -> AuthScheme {
        self.auth_scheme.unwrap_or_default()
    }

    pub fn effective_body_encoding(&self) -> BodyEncoding {
        self.body_encoding.unwrap_or_default()
    }

    /// Effective request timeout: the override, else the version's documented ceiling.
    pub fn timeout(&self) -> Result<Duration> {
        match self.timeout_secs {
            Some(0) => Err(Error::configuration_with_context(
                "timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("timeout_secs")
                    .with_source("config"),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(self.effective_api_version().limits().timeout_ceiling),
        }
    }

    /// Normalized path prefix: empty, or `/segment` without a trailing slash.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.path_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

/// Resolve the API key: explicit value, then `API_KEY`, then the OS keyring.
pub fn resolve_api_key(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty()))
        .or_else(|| {
            let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
            entry.get_password().ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn from_lookup_reads_all_fields() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://tts.example.com"),
            (ENV_API_KEY, "secret"),
            (ENV_API_VERSION, "voice-id"),
            (ENV_AUTH_SCHEME, "api-key-header"),
            (ENV_TIMEOUT_SECS, "120"),
            (ENV_PATH_PREFIX, "/api/"),
            (ENV_BODY_ENCODING, "multipart"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("https://tts.example.com"));
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.api_version, Some(ApiVersion::VoiceId));
        assert_eq!(cfg.auth_scheme, Some(AuthScheme::ApiKeyHeader));
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(120));
        assert_eq!(cfg.normalized_prefix(), "/api");
        assert_eq!(cfg.body_encoding, Some(BodyEncoding::Multipart));
    }

    #[test]
    fn defaults_follow_version_ceiling() {
        let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.api_version, None);
        assert_eq!(cfg.effective_api_version(), ApiVersion::SpeakerUrl);
        assert_eq!(cfg.effective_auth_scheme(), AuthScheme::Bearer);
        assert_eq!(cfg.effective_body_encoding(), BodyEncoding::Json);
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(600));
        assert_eq!(cfg.normalized_prefix(), "");

        let cfg = ClientConfig {
            api_version: Some(ApiVersion::VoiceId),
            ..Default::default()
        };
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[(ENV_API_VERSION, "v9")])).is_err());
        let cfg = ClientConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(cfg.timeout(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn yaml_config() {
        let cfg = ClientConfig::from_yaml_str(
            r#"
base_url: https://echo-tts.example.modal.run
api_version: speaker-url
auth_scheme: bearer
timeout_secs: 900
"#,
        )
        .unwrap();
        assert_eq!(cfg.api_version, Some(ApiVersion::SpeakerUrl));
        assert_eq!(cfg.body_encoding, None);
        assert_eq!(cfg.timeout_secs, Some(900));
        assert!(cfg.api_key.is_none());

        assert!(ClientConfig::from_yaml_str("api_version: [1, 2]").is_err());
    }

    #[test]
    fn merge_keeps_explicit_values() {
        let explicit = ClientConfig {
            base_url: Some("https://a".into()),
            ..Default::default()
        };
        let env = ClientConfig {
            base_url: Some("https://b".into()),
            api_key: Some("k".into()),
            ..Default::default()
        };
        let merged = explicit.merge_missing(env);
        assert_eq!(merged.base_url.as_deref(), Some("https://a"));
        assert_eq!(merged.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn merge_fills_contract_settings_missing_from_yaml() {
        let file = ClientConfig::from_yaml_str("base_url: https://echo-tts.example.com\n").unwrap();
        let env = ClientConfig::from_lookup(lookup(&[
            (ENV_API_VERSION, "voice-id"),
            (ENV_AUTH_SCHEME, "api-key-header"),
            (ENV_BODY_ENCODING, "multipart"),
        ]))
        .unwrap();
        let merged = file.merge_missing(env);
        assert_eq!(merged.effective_api_version(), ApiVersion::VoiceId);
        assert_eq!(merged.effective_auth_scheme(), AuthScheme::ApiKeyHeader);
        assert_eq!(merged.effective_body_encoding(), BodyEncoding::Multipart);
        assert_eq!(merged.timeout().unwrap(), Duration::from_secs(300));

        let file = ClientConfig::from_yaml_str("api_version: speaker-url\nbody_encoding: json\n")
            .unwrap();
        let env = ClientConfig::from_lookup(lookup(&[
            (ENV_API_VERSION, "voice-id"),
            (ENV_BODY_ENCODING, "multipart"),
        ]))
        .unwrap();
        let merged = file.merge_missing(env);
        assert_eq!(merged.effective_api_version(), ApiVersion::SpeakerUrl);
        assert_eq!(merged.effective_body_encoding(), BodyEncoding::Json);
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = ClientConfig {
            api_key: Some("super-secret".into()),
            ..Default::default()
        };
        let text = format!("{:?}", cfg);
        assert!(!text.contains("super-secret"));
        assert!(text.contains("<redacted>"));
    }
}
