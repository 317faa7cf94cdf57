//! Incremental-compiler collaborator seam.
//!
//! The engine never compiles anything itself; it hands the main entry and
//! the invalidated sources to whatever resident compiler the session runs
//! and consumes the result.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// One recompile request, owned so it can move into the spawned task.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// URI of the program entry point.
    pub main_entry: String,
    /// Sources invalidated since the last successful compile.
    pub invalidated_sources: Vec<String>,
    /// Where the compiler should leave the kernel artifact.
    pub output_path: PathBuf,
    /// Package resolution configuration handed through verbatim.
    pub package_config: PathBuf,
}

/// Outcome of one compile cycle.
///
/// A nonzero `error_count` is a normal, reportable outcome — the compiler
/// ran and found problems — not a sync failure.
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Kernel artifact produced by this cycle.
    pub output_path: PathBuf,
    pub error_count: usize,
    pub missing_sources: Vec<String>,
}

/// The compiler request mechanism itself broke (process died, pipe closed).
#[derive(Debug, Error)]
#[error("compiler request failed: {0}")]
pub struct CompileError(pub String);

#[async_trait]
pub trait Recompiler: Send + Sync {
    async fn recompile(&self, request: CompileRequest) -> Result<CompileResult, CompileError>;
}
