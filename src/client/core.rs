//! 客户端核心：合成、预热、健康检查与服务信息。
//!
//! Core client: synthesis, warmup, health and service info.

use crate::client::builder::TtsClientBuilder;
use crate::client::error_classification::classify_status;
use crate::config::BodyEncoding;
use crate::contract::{
    ApiVersion, AudioFormat, AudioOutput, HealthStatus, ServiceInfo, SynthesisRequest,
    ValidatedRequest,
};
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub(crate) const INDEX_PATH: &str = "/";
pub(crate) const HEALTH_PATH: &str = "/health";
pub(crate) const TTS_PATH: &str = "/tts";

/// Client for the Echo-TTS service.
///
/// Holds configuration only; every call issues exactly one HTTP request and never retries.
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct TtsClient {
    pub(crate) transport: HttpTransport,
    pub(crate) version: ApiVersion,
    encoding: BodyEncoding,
}

/// A successful raw response.
pub(crate) struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TtsClient {
    pub(crate) fn new(
        transport: HttpTransport,
        version: ApiVersion,
        encoding: BodyEncoding,
    ) -> Self {
        Self {
            transport,
            version,
            encoding,
        }
    }

    pub fn builder() -> TtsClientBuilder {
        TtsClientBuilder::new()
    }

    pub fn api_version(&self) -> ApiVersion {
        self.version
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    pub fn body_encoding(&self) -> BodyEncoding {
        self.encoding
    }

    /// Validate a request against this client's contract version without sending it.
    pub fn validate(&self, request: &SynthesisRequest) -> Result<ValidatedRequest> {
        request.validate(self.version)
    }

    /// Synthesize speech and return the audio bytes exactly as the service sent them.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioOutput> {
        let validated = self.validate(request)?;
        self.synthesize_validated(&validated).await
    }

    /// Like [`TtsClient::synthesize`], but gives up when `cancel` fires.
    ///
    /// Cancelling drops the in-flight HTTP request. The job already submitted to the service
    /// is not stopped.
    pub async fn synthesize_with_cancel(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> Result<AudioOutput> {
        let validated = self.validate(request)?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(api_version = %self.version, "echo-tts synthesis cancelled");
                Err(Error::Cancelled)
            }
            res = self.synthesize_validated(&validated) => res,
        }
    }

    /// Send an already validated request.
    pub async fn synthesize_validated(&self, request: &ValidatedRequest) -> Result<AudioOutput> {
        if request.version() != self.version {
            return Err(Error::invalid_parameter_with_context(
                format!(
                    "request was validated for the {} contract but the client speaks {}",
                    request.version(),
                    self.version
                ),
                ErrorContext::new().with_source("synthesize"),
            ));
        }

        let (req, request_id) = self.transport.request(Method::POST, TTS_PATH);
        let req = match self.encoding {
            BodyEncoding::Json => req.json(&request.to_json()),
            BodyEncoding::Multipart => req.multipart(request.to_multipart()),
        };

        let start = Instant::now();
        let raw = self.execute(req, &request_id, "synthesize", start).await?;

        let format = AudioFormat::from_content_type(raw.content_type.as_deref());
        if format == AudioFormat::Unknown {
            warn!(
                request_id = request_id.as_str(),
                content_type = raw.content_type.as_deref().unwrap_or(""),
                "echo-tts synthesis returned a non-audio content type"
            );
        }
        info!(
            http_status = raw.status,
            request_id = request_id.as_str(),
            api_version = %self.version,
            speaker = request.speaker_kind(),
            num_steps = request.num_steps(),
            bytes = raw.body.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "echo-tts synthesis completed"
        );

        Ok(AudioOutput {
            data: raw.body,
            format,
            content_type: raw.content_type,
        })
    }

    /// Wake the service so the next synthesis skips the cold start.
    ///
    /// Only success or failure is reported.
    pub async fn warmup(&self) -> Result<()> {
        let (req, request_id) = self.transport.request(Method::GET, HEALTH_PATH);
        let start = Instant::now();
        self.execute(req, &request_id, "warmup", start).await?;
        info!(
            request_id = request_id.as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            "echo-tts warmup completed"
        );
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json(HEALTH_PATH, "health").await
    }

    /// Service description. It is served at the root even when endpoints sit under a prefix.
    pub async fn info(&self) -> Result<ServiceInfo> {
        let (req, request_id) = self.transport.root_request(Method::GET, INDEX_PATH);
        self.fetch_json(req, &request_id, "info").await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &'static str,
    ) -> Result<T> {
        let (req, request_id) = self.transport.request(Method::GET, path);
        self.fetch_json(req, &request_id, operation).await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        request_id: &str,
        operation: &'static str,
    ) -> Result<T> {
        let raw = self
            .execute(req, request_id, operation, Instant::now())
            .await?;
        Ok(serde_json::from_slice(&raw.body)?)
    }

    /// Single attempt: send, read the body, classify non-success statuses.
    pub(crate) async fn execute(
        &self,
        req: reqwest::RequestBuilder,
        request_id: &str,
        operation: &'static str,
        start: Instant,
    ) -> Result<RawResponse> {
        let result = self.send_once(req).await;
        if let Err(e) = &result {
            info!(
                http_status = e.http_status(),
                error_code = e.code().code(),
                operation,
                request_id,
                api_version = %self.version,
                duration_ms = start.elapsed().as_millis() as u64,
                "echo-tts request failed"
            );
        }
        result
    }

    async fn send_once(&self, req: reqwest::RequestBuilder) -> Result<RawResponse> {
        let resp = self.transport.send(req).await?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = self.transport.read_body(resp).await?;
        if !(200..300).contains(&status) {
            return Err(classify_status(self.version, status, &body));
        }
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
