//! HTTP transport seam for the network writer.
//!
//! The writer only needs one verb — PUT a body to a URL — so the seam is a
//! single-method trait. The production implementation wraps a
//! `reqwest::Client`; tests script faults directly.

use async_trait::async_trait;
use thiserror::Error;

/// Classified outcome of a failed PUT.
#[derive(Debug, Error)]
pub enum TransportFault {
    /// Connection-reset-class failure; expected to succeed on retry.
    #[error("connection reset by peer")]
    ConnectionReset,

    /// The remote end answered with a non-success status.
    #[error("http status {0}")]
    Status(u16),

    /// Anything else: DNS, TLS, timeouts, the peer going away for good.
    #[error("{0}")]
    Other(String),
}

/// One-verb transport used by [`HttpWriter`](crate::HttpWriter).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn put(&self, url: &str, body: Vec<u8>) -> Result<(), TransportFault>;
}

/// Production transport over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-provided client (custom timeouts, proxies, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn put(&self, url: &str, body: Vec<u8>) -> Result<(), TransportFault> {
        let response = self
            .client
            .put(url)
            .body(body)
            .send()
            .await
            .map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportFault::Status(status.as_u16()));
        }
        Ok(())
    }
}

fn classify(err: reqwest::Error) -> TransportFault {
    if is_connection_reset(&err) {
        TransportFault::ConnectionReset
    } else {
        TransportFault::Other(err.to_string())
    }
}

/// Walk the error source chain looking for an `io::Error` with
/// `ConnectionReset`; reqwest buries the kind a few layers down.
fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = err.source();
    }
    false
}
