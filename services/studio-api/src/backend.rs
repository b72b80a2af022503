use async_trait::async_trait;
use audit_studio::report::decode_response;
use audit_studio::StudioError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Scoring backend seen as opaque JSON request/response calls.
#[async_trait]
pub(crate) trait ActionBackend: Send + Sync {
    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, StudioError>;
}

pub(crate) struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub(crate) fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("studio-api/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl ActionBackend for HttpBackend {
    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, StudioError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| StudioError::RequestFailure(format!("backend unreachable: {err}")))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| {
            StudioError::RequestFailure(format!("backend response interrupted: {err}"))
        })?;

        tracing::debug!(%url, status, "backend call finished");
        decode_response(status, &bytes)
    }
}

/// Reinterpret a successful backend body as one of the typed payloads.
pub(crate) fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, StudioError> {
    serde_json::from_value(value).map_err(|err| {
        StudioError::RequestFailure(format!("backend returned an unreadable response: {err}"))
    })
}
