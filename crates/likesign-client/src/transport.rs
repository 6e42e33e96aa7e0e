//! HTTP transport seam
//!
//! [`Client`](crate::Client) talks JSON to the LCD through [`HttpTransport`] so
//! that tests can script responses without a node.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure to complete one HTTP exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, timeout or protocol failure
    #[error("http request failed:: {0}")]
    Request(String),

    /// The server answered with a non-2xx status
    #[error("unexpected status {status}:: {body}")]
    Status { status: u16, body: String },

    /// The response body was not JSON
    #[error("invalid response body:: {0}")]
    Body(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Value, TransportError>;

    async fn post(&self, url: &Url, body: &Value) -> Result<Value, TransportError>;
}

/// Production transport on top of `reqwest`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { http_client })
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::read_json(response).await
    }

    async fn post(&self, url: &Url, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .http_client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::read_json(response).await
    }
}
