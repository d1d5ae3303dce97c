use std::sync::Arc;

use anyhow::Context;
use futures::future::{FutureExt, LocalBoxFuture};
use geojson::FeatureCollection;
use reqwest::{header, Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;

pub type ClientResult<T> = Result<T, ClientError>;

/// Anything that can produce a feature collection for a relative API path.
///
/// The returned future is `'static` so callers can park it in a cache and
/// share it between several waiters.
pub trait GeoJsonSource {
    fn fetch_geojson(&self, endpoint: &str)
        -> LocalBoxFuture<'static, ClientResult<FeatureCollection>>;
}

#[derive(Clone)]
pub struct GeoClient {
    inner: reqwest::Client,
    config: Arc<AppConfig>,
    base_url: String,
}

impl GeoClient {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let timeout = config.request_timeout;
        let base_url = normalize_base_url(&config.api_base_url);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            inner: client,
            config: Arc::new(config),
            base_url,
        })
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read-only fetch of one thematic dataset, e.g. `/economy/contracts/geojson`.
    pub async fn get_feature_collection(&self, endpoint: &str) -> ClientResult<FeatureCollection> {
        let url = join_path(&self.base_url, endpoint);
        tracing::debug!(%url, "fetching feature collection");
        let builder = self.request(Method::GET, &url);
        let bytes = self.send(builder).await?;
        decode_feature_collection(&bytes)
    }

    /// Probes `GET /health` on the API origin.
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let url = join_path(&self.config.api_origin(), "health");
        let builder = self.request(Method::GET, &url);
        let bytes = self.send(builder).await?;
        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.inner
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClientResult<Vec<u8>> {
        let response = builder.send().await.map_err(ClientError::from)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::from)?;

        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status,
                body: bytes.to_vec(),
            });
        }

        if bytes.is_empty() {
            return Err(ClientError::EmptyResponse(status));
        }

        Ok(bytes.to_vec())
    }
}

impl GeoJsonSource for GeoClient {
    fn fetch_geojson(
        &self,
        endpoint: &str,
    ) -> LocalBoxFuture<'static, ClientResult<FeatureCollection>> {
        let client = self.clone();
        let endpoint = endpoint.to_string();
        async move { client.get_feature_collection(&endpoint).await }.boxed_local()
    }
}

pub(crate) fn decode_feature_collection(bytes: &[u8]) -> ClientResult<FeatureCollection> {
    serde_json::from_slice::<FeatureCollection>(bytes).map_err(ClientError::from)
}

fn normalize_base_url(input: &str) -> String {
    input.trim_end_matches('/').to_string()
}

fn join_path(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// What the UI is allowed to know about a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Parse,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("client setup failed: {0:#}")]
    Setup(#[from] anyhow::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("empty response body: {0}")]
    EmptyResponse(StatusCode),
    #[error("unexpected status {status}: {} bytes", body.len())]
    UnexpectedStatus { status: StatusCode, body: Vec<u8> },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::EmptyResponse(status) => Some(*status),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Parse,
            _ => ErrorKind::Fetch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_path_normalizes_slashes() {
        assert_eq!(
            join_path("http://localhost:8000/api/v1/", "/economy/contracts/geojson"),
            "http://localhost:8000/api/v1/economy/contracts/geojson"
        );
        assert_eq!(
            join_path("http://localhost:8000/api/v1", "environment/deforestation"),
            "http://localhost:8000/api/v1/environment/deforestation"
        );
    }

    #[test]
    fn decodes_feature_collection() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-68.15, -16.5] },
                "properties": { "amount": 1_200_000, "title": "Obra vial" }
            }]
        });
        let bytes = serde_json::to_vec(&body).unwrap();
        let collection = decode_feature_collection(&bytes).unwrap();
        assert_eq!(collection.features.len(), 1);
        let props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(props.get("title").and_then(|v| v.as_str()), Some("Obra vial"));
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        let err = decode_feature_collection(b"<html>502</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.status().is_none());
    }

    #[test]
    fn non_collection_json_is_a_parse_error() {
        let bytes = serde_json::to_vec(&json!({ "detail": "Not Found" })).unwrap();
        let err = decode_feature_collection(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn bad_status_is_a_fetch_error() {
        let err = ClientError::UnexpectedStatus {
            status: StatusCode::BAD_GATEWAY,
            body: b"upstream down".to_vec(),
        };
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.to_string(), "unexpected status 502 Bad Gateway: 13 bytes");
    }

    #[test]
    fn health_payload_reports_ok() {
        let health: HealthStatus =
            serde_json::from_value(json!({ "status": "ok", "version": "1.0.0" })).unwrap();
        assert!(health.is_ok());
        assert_eq!(health.version.as_deref(), Some("1.0.0"));
    }
}
