//! Delivery of encoded snapshots to the engine

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use crate::error::{ProtocolError, Result};

/// One-shot delivery of a payload. Success means the receiver answered 2xx.
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    async fn transmit(&self, payload: Bytes) -> Result<()>;
}

/// POSTs payloads as `application/octet-stream`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProtocolError::Transmission {
                status: None,
                reason: format!("failed to build http client: {}", e),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    fn request_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            ProtocolError::Timeout {
                step: "transmit",
                millis: self.timeout.as_millis() as u64,
            }
        } else {
            ProtocolError::Transmission {
                status: err.status().map(|s| s.as_u16()),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl SnapshotTransport for HttpTransport {
    async fn transmit(&self, payload: Bytes) -> Result<()> {
        let len = payload.len();
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProtocolError::Transmission {
                status: Some(status.as_u16()),
                reason: if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.trim().to_string()
                },
            });
        }

        debug!(endpoint = %self.endpoint, bytes = len, status = status.as_u16(), "snapshot delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transmission_failure() {
        // Port 9 (discard) on localhost is closed in test environments
        let transport = HttpTransport::new("http://127.0.0.1:9/config", Duration::from_secs(2)).unwrap();
        let err = transport.transmit(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
