//! Control-channel seam to the running runtime.
//!
//! The engine consumes exactly two calls (`_createDevFS`, `_deleteDevFS`);
//! the transport behind them is the caller's business.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// RPC-level failures, as classified by the transport implementation.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The runtime's control service vanished mid-call.
    #[error("runtime service disappeared")]
    ServiceDisappeared,

    #[error("rpc call failed: {0}")]
    Call(String),
}

/// JSON request/response surface of the runtime control channel.
#[async_trait]
pub trait RuntimeRpc: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}
