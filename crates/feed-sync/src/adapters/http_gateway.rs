//! HTTP API Gateway Adapter
//!
//! Implements `ApiGateway` over the REST backend with `reqwest`.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ConfigError, FeedClientConfig};
use crate::domain::{AuthToken, GatewayError};
use crate::ports::outbound::{ApiGateway, ApiRequest, Endpoint, Method};

/// REST gateway.
pub struct HttpApiGateway {
    client: Client,
    base_url: String,
    auth_scheme: String,
}

impl HttpApiGateway {
    /// Build a gateway from validated configuration.
    pub fn new(config: &FeedClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let mut base_url = config.api_base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            auth_scheme: config.auth_scheme.trim().to_string(),
        })
    }

    /// Absolute URL of an endpoint (without query string).
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn authorization(&self, token: &AuthToken) -> String {
        format!("{} {}", self.auth_scheme, token.expose())
    }
}

#[async_trait]
impl ApiGateway for HttpApiGateway {
    async fn call(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        let url = self.url_for(&request.endpoint);
        debug!(method = %request.method, %url, "[feed-sync] API call");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };
        let mut builder = self.client.request(method, &url);

        let query = request.endpoint.query();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = &request.auth {
            builder = builder.header(AUTHORIZATION, self.authorization(token));
        }
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let err = rejection(status.as_u16(), status.canonical_reason(), &body);
            warn!(status = status.as_u16(), kind = request.endpoint.kind(), "[feed-sync] API call rejected");
            return Err(err);
        }

        decode_body(&body)
    }

    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>, GatewayError> {
        debug!(%uri, "[feed-sync] Fetching asset");
        let response = self.client.get(uri).send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), status.canonical_reason(), &body));
        }
        Ok(body.to_vec())
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Network(format!("request timed out: {err}"))
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// Map a non-2xx response: the body's `detail` wins, then the status text.
fn rejection(status: u16, reason: Option<&str>, body: &[u8]) -> GatewayError {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string));
    let message = detail
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}"));
    GatewayError::Rejected { status, message }
}

/// Empty bodies (204) decode to `Null`.
fn decode_body(body: &[u8]) -> Result<Value, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::Malformed(e.to_string()))
}
