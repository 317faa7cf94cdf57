//! Error types for devsync-transfer.
//!
//! Filesystem faults from the local writer are re-wrapped here; the native
//! `std::io::Error` never crosses this crate's boundary bare.

use std::path::PathBuf;

use thiserror::Error;

use devsync_core::ContentError;

use crate::transport::TransportFault;

/// All errors that can arise from delivering a batch of entries.
#[derive(Debug, Error)]
pub enum TransferError {
    /// An artifact's backing resource vanished or became unreadable.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// An I/O error from the local-copy writer, with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Gzip encoding of an upload payload failed.
    #[error("gzip encoding failed: {source}")]
    Compress {
        #[source]
        source: std::io::Error,
    },

    /// A PUT failed with a non-retryable transport fault.
    #[error("PUT {url} failed: {fault}")]
    Put {
        url: String,
        #[source]
        fault: TransportFault,
    },

    /// Transient failures kept happening past the retry ceiling.
    #[error("PUT {url} still failing after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// Convenience constructor for [`TransferError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TransferError {
    TransferError::Io {
        path: path.into(),
        source,
    }
}
