//! Error types for devsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from reading artifact content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The backing resource vanished or became unreadable between the
    /// change check and the read.
    #[error("unreadable content at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Gzip encoding of a compressed-text entry failed.
    #[error("gzip encoding failed: {source}")]
    Compress {
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`ContentError::Unreadable`].
pub(crate) fn read_err(path: impl Into<PathBuf>, source: std::io::Error) -> ContentError {
    ContentError::Unreadable {
        path: path.into(),
        source,
    }
}
