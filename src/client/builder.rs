use crate::client::core::TtsClient;
use crate::config::{resolve_api_key, BodyEncoding, ClientConfig, ENV_API_KEY, KEYRING_SERVICE};
use crate::contract::ApiVersion;
use crate::transport::{AuthScheme, HttpTransport, TransportSettings};
use crate::{Error, ErrorContext, Result};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Builder for [`TtsClient`].
///
/// Explicit calls win over the loaded [`ClientConfig`]; the API key falls back to `API_KEY`
/// and then the OS keyring.
#[derive(Debug, Default)]
pub struct TtsClientBuilder {
    config: ClientConfig,
    timeout: Option<Duration>,
}

impl TtsClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            timeout: None,
        }
    }

    /// Start from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(ClientConfig::from_env()?))
    }

    /// Start from a YAML file; unset fields are filled from the environment.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = ClientConfig::from_yaml_file(path)?;
        Ok(Self::from_config(file.merge_missing(ClientConfig::from_env()?)))
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.config.api_version = Some(version);
        self
    }

    pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.config.auth_scheme = Some(scheme);
        self
    }

    /// Override the version's documented timeout ceiling.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path prefix in front of every endpoint, e.g. `/api`.
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.path_prefix = prefix.into();
        self
    }

    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(url.into());
        self
    }

    pub fn body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.config.body_encoding = Some(encoding);
        self
    }

    pub fn build(self) -> Result<TtsClient> {
        let config = self.config;
        let base_url = config.base_url.clone().ok_or_else(|| {
            Error::configuration_with_context(
                "base URL must be specified",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("client_builder"),
            )
        })?;
        let api_key = resolve_api_key(config.api_key.clone()).ok_or_else(|| {
            Error::configuration_with_context(
                "API key required",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details(format!(
                        "set {} or store a key in the '{}' keyring",
                        ENV_API_KEY, KEYRING_SERVICE
                    ))
                    .with_source("client_builder"),
            )
        })?;
        let api_version = config.effective_api_version();
        let body_encoding = config.effective_body_encoding();
        let timeout = match self.timeout {
            Some(t) if t.is_zero() => {
                return Err(Error::configuration("timeout must be greater than zero"))
            }
            Some(t) => t,
            None => config.timeout()?,
        };

        let transport = HttpTransport::new(TransportSettings {
            base_url,
            path_prefix: config.normalized_prefix(),
            api_key,
            auth_scheme: config.effective_auth_scheme(),
            timeout,
            proxy_url: config.proxy_url.clone(),
        })?;

        debug!(
            api_version = %api_version,
            timeout_secs = timeout.as_secs(),
            body_encoding = ?body_encoding,
            "echo-tts client built"
        );

        Ok(TtsClient::new(
            transport,
            api_version,
            body_encoding,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_base_url() {
        let err = TtsClientBuilder::new().api_key("k").build().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("base_url")
        );
    }

    #[test]
    fn timeout_defaults_to_version_ceiling() {
        let client = TtsClientBuilder::new()
            .base_url("https://tts.example.com")
            .api_key("k")
            .api_version(ApiVersion::VoiceId)
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(300));

        let client = TtsClientBuilder::new()
            .base_url("https://tts.example.com")
            .api_key("k")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert_eq!(client.api_version(), ApiVersion::SpeakerUrl);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = TtsClientBuilder::new()
            .base_url("https://tts.example.com")
            .api_key("k")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
