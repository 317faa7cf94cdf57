//! Runtime-side synchronization namespace lifecycle.
//!
//! Create is fatal on failure — the caller must not assume a namespace
//! exists. Destroy never raises: it runs on teardown paths where an error
//! would mask the true cause of shutdown.

use serde_json::{json, Value};

use crate::error::EngineError;
use crate::rpc::{RpcError, RuntimeRpc};

/// A created namespace: logical name plus the base URI the runtime
/// assigned to it. The URI is immutable once set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevFs {
    name: String,
    base_uri: String,
}

impl DevFs {
    /// Issue `_createDevFS` and bind the returned base URI.
    pub async fn create(rpc: &dyn RuntimeRpc, name: &str) -> Result<Self, EngineError> {
        let namespace_err = |source: RpcError| EngineError::Namespace {
            name: name.to_string(),
            source,
        };

        let response = rpc
            .call("_createDevFS", json!({ "fsName": name }))
            .await
            .map_err(namespace_err)?;

        let uri = response
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| namespace_err(RpcError::Call("response carried no uri".to_string())))?;

        // Trailing slash off so URL joins stay stable.
        let base_uri = uri.trim_end_matches('/').to_string();
        tracing::info!(name, uri = %base_uri, "created devfs");
        Ok(Self {
            name: name.to_string(),
            base_uri,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Issue `_deleteDevFS`; every failure is swallowed (logged at most).
    pub async fn destroy(self, rpc: &dyn RuntimeRpc) {
        let params = json!({ "fsName": self.name.clone() });
        if let Err(err) = rpc.call("_deleteDevFS", params).await {
            tracing::warn!(name = %self.name, error = %err, "ignoring devfs delete failure");
        } else {
            tracing::debug!(name = %self.name, "destroyed devfs");
        }
    }
}
