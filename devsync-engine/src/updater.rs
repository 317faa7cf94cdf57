//! Update orchestration: one compile-and-sync cycle per call.
//!
//! ## `update` — pipeline
//!
//! 1. Launch the compile request as a spawned task (it must not block the
//!    bundle step).
//! 2. Build/refresh the asset bundle, if one was supplied.
//! 3. Join the compile task; a nonzero error count short-circuits to a
//!    `success = false` report.
//! 4. Advance the last-compiled marker and collect the transfer set: the
//!    kernel artifact at the reload path plus every bundle entry whose
//!    one-shot modified flag fires.
//! 5. Push the set through the supplied writer, or the default network
//!    writer bound to the namespace URI.
//!
//! Bundle completion is always observed before the compile result is
//! consumed — compile latency is amortized against bundle-build latency.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use devsync_core::{Clock, DevFsContent, UpdateReport};
use devsync_transfer::{DevFsWriter, HttpTransport, HttpWriter};

use crate::bundle::AssetBundle;
use crate::compiler::{CompileRequest, Recompiler};
use crate::devfs::DevFs;
use crate::error::EngineError;

/// Arguments for one update cycle.
pub struct UpdateParams<'a> {
    /// URI of the program entry point.
    pub main_entry: String,
    /// Sources invalidated since the last successful compile.
    pub invalidated_sources: Vec<String>,
    /// Where the compiler should leave the kernel artifact.
    pub output_path: PathBuf,
    /// Destination path the kernel artifact is synced to.
    pub reload_path: String,
    /// Package resolution configuration handed to the compiler verbatim.
    pub package_config: PathBuf,
    /// Asset bundle to refresh and diff, if the build has one.
    pub bundle: Option<&'a mut dyn AssetBundle>,
    /// Alternate writer (e.g. local-copy for offline builds); the default
    /// network writer is used when absent.
    pub writer: Option<&'a dyn DevFsWriter>,
}

/// Drives repeated update cycles against one created namespace.
///
/// Owns the last-compiled marker and its single-slot undo; not intended to
/// be shared — calls to the same updater are serialized by `&mut self`.
pub struct DevFsUpdater {
    devfs: DevFs,
    compiler: Arc<dyn Recompiler>,
    transport: Arc<dyn HttpTransport>,
    writer: HttpWriter,
    clock: Arc<dyn Clock>,
    last_compiled: DateTime<Utc>,
    previous_compiled: Option<DateTime<Utc>>,
}

impl DevFsUpdater {
    pub fn new(
        devfs: DevFs,
        compiler: Arc<dyn Recompiler>,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let writer = HttpWriter::new(Arc::clone(&transport), devfs.base_uri());
        Self {
            devfs,
            compiler,
            transport,
            writer,
            clock,
            last_compiled: DateTime::<Utc>::UNIX_EPOCH,
            previous_compiled: None,
        }
    }

    /// Override the default writer's retry policy.
    pub fn with_retry_policy(mut self, throttle: Duration, max_retries: u32) -> Self {
        self.writer = HttpWriter::new(Arc::clone(&self.transport), self.devfs.base_uri())
            .with_retry_policy(throttle, max_retries);
        self
    }

    pub fn devfs(&self) -> &DevFs {
        &self.devfs
    }

    /// When the most recent successful compile completed.
    pub fn last_compiled(&self) -> DateTime<Utc> {
        self.last_compiled
    }

    /// One-level rollback of the last-compiled marker: restores the
    /// immediately prior value once; a second consecutive call is a no-op.
    pub fn reset_last_compiled(&mut self) {
        if let Some(previous) = self.previous_compiled.take() {
            self.last_compiled = previous;
        }
    }

    /// Run one update cycle. See the module docs for the pipeline.
    pub async fn update(&mut self, params: UpdateParams<'_>) -> Result<UpdateReport, EngineError> {
        let UpdateParams {
            main_entry,
            invalidated_sources,
            output_path,
            reload_path,
            package_config,
            mut bundle,
            writer,
        } = params;
        let invalidated_count = invalidated_sources.len();

        let compile_started = self.clock.now();
        let compiler = Arc::clone(&self.compiler);
        let request = CompileRequest {
            main_entry,
            invalidated_sources,
            output_path,
            package_config,
        };
        let compile_task = tokio::spawn(async move { compiler.recompile(request).await });
        // Give the compile task its first poll so the request is actually in
        // flight before the synchronous bundle build starts.
        tokio::task::yield_now().await;

        if let Some(bundle) = bundle.as_deref_mut() {
            tracing::info!("Processing bundle.");
            if bundle.needs_build() {
                bundle.build()?;
            }
            tracing::info!("Bundle processing done.");
        }

        let compile = compile_task
            .await
            .map_err(|err| EngineError::CompileJoin(err.to_string()))??;
        let compile_duration = self.clock.now() - compile_started;

        if compile.error_count > 0 {
            tracing::info!(
                errors = compile.error_count,
                "compile reported errors, skipping sync"
            );
            return Ok(UpdateReport::failed(compile_duration));
        }
        if !compile.missing_sources.is_empty() {
            tracing::debug!(missing = compile.missing_sources.len(), "missing sources");
        }

        let marker_before = self.last_compiled;
        let undo_before = self.previous_compiled;
        self.previous_compiled = Some(self.last_compiled);
        self.last_compiled = Utc::now();

        let mut entries: HashMap<String, DevFsContent> = HashMap::new();
        entries.insert(reload_path, DevFsContent::from_file(&compile.output_path));
        if let Some(bundle) = bundle.as_deref_mut() {
            for (path, content) in bundle.entries_mut() {
                if content.is_modified() {
                    entries.insert(path.clone(), content.clone());
                }
            }
        }

        let transfer_started = self.clock.now();
        let written = match writer {
            Some(writer) => writer.write(&mut entries).await,
            None => self.writer.write(&mut entries).await,
        };
        let synced_bytes = match written {
            Ok(bytes) => bytes,
            Err(err) => {
                // A failed sync must not advance session state; that includes
                // the undo slot a prior success left behind.
                self.last_compiled = marker_before;
                self.previous_compiled = undo_before;
                return Err(err.into());
            }
        };
        let transfer_duration = self.clock.now() - transfer_started;

        tracing::info!(
            synced_bytes,
            compile_ms = compile_duration.as_millis() as u64,
            transfer_ms = transfer_duration.as_millis() as u64,
            "update complete"
        );
        Ok(UpdateReport::ok(
            synced_bytes,
            compile_duration,
            transfer_duration,
            Some(invalidated_count),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
