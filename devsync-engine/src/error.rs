//! Error surface for namespace lifecycle and the update pipeline.

use thiserror::Error;

use devsync_transfer::TransferError;

use crate::bundle::BundleError;
use crate::compiler::CompileError;
use crate::rpc::RpcError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The create-namespace RPC failed; fatal to the session.
    #[error("devfs create failed for {name}: {source}")]
    Namespace {
        name: String,
        #[source]
        source: RpcError,
    },

    /// The writer failed to deliver one or more entries. Unlike namespace
    /// destroy this propagates: the caller needs to know the sync did not
    /// land.
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// The compiler request mechanism broke (distinct from compile errors,
    /// which are a `success = false` report).
    #[error(transparent)]
    Compiler(#[from] CompileError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    /// The spawned compile task was cancelled or panicked.
    #[error("compile task aborted: {0}")]
    CompileJoin(String),
}
