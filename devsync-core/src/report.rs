//! Per-update telemetry record.

use std::time::Duration;

use serde::Serialize;

/// Immutable result of one update cycle.
///
/// Created fresh per update call so callers can drive a hot reload or
/// restart off the outcome; never mutated after return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub success: bool,
    /// Total uncompressed bytes delivered by the writer.
    pub synced_bytes: u64,
    pub compile_duration: Duration,
    pub transfer_duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidated_sources: Option<usize>,
}

impl UpdateReport {
    pub fn ok(
        synced_bytes: u64,
        compile_duration: Duration,
        transfer_duration: Duration,
        invalidated_sources: Option<usize>,
    ) -> Self {
        Self {
            success: true,
            synced_bytes,
            compile_duration,
            transfer_duration,
            invalidated_sources,
        }
    }

    /// A compile that reported errors: nothing was synced.
    pub fn failed(compile_duration: Duration) -> Self {
        Self {
            success: false,
            synced_bytes: 0,
            compile_duration,
            transfer_duration: Duration::ZERO,
            invalidated_sources: None,
        }
    }
}
