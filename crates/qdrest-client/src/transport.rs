//! reqwest-backed HTTP transport
//!
//! One `reqwest::Client` per transport, built with the configured timeout
//! and default headers. No retries.

use crate::HttpTransport;
use async_trait::async_trait;
use qdrest_core::{ApiRequest, ClientConfig, ConfigError, Method, QdrantError, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "api-key";

/// Headers attached to every request
///
/// `api-key` is only present when a key is given; there is no empty header.
pub fn default_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(key).map_err(|_| {
            QdrantError::Config(ConfigError::InvalidValue {
                key: "api_key".to_string(),
                value: "<redacted>".to_string(),
            })
        })?;
        value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, value);
    }

    Ok(headers)
}

/// HTTP transport over reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport from a client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.host.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| {
            QdrantError::Config(ConfigError::InvalidValue {
                key: "host".to_string(),
                value: config.host.clone(),
            })
        })?;

        let mut builder = Client::builder().default_headers(default_headers(config.api_key())?);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| QdrantError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> QdrantError {
    if err.is_timeout() {
        QdrantError::Timeout(err.to_string())
    } else {
        QdrantError::Transport(err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed to read body of HTTP {} response: {}", status, e);
                    String::new()
                }
            };
            return Err(QdrantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }
}
