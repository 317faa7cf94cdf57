//! Artifact content model with one-shot change tracking.
//!
//! Each variant answers two questions: what bytes should land on the runtime
//! side, and did this entry change since the last time anyone asked. The
//! modified flag is one-shot — it reports `true` at most once per underlying
//! state change, then stays `false` until the next change.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{read_err, ContentError};

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Content backed by an owned byte buffer.
#[derive(Debug, Clone)]
pub struct BytesContent {
    data: Vec<u8>,
    dirty: bool,
}

impl BytesContent {
    /// A freshly constructed buffer counts as modified so the first sync
    /// always transfers it.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, dirty: true }
    }

    /// Replace the buffer wholesale and re-arm the dirty flag.
    pub fn set(&mut self, data: Vec<u8>) {
        self.data = data;
        self.dirty = true;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Content backed by an owned string; its byte form is the UTF-8 encoding.
#[derive(Debug, Clone)]
pub struct TextContent {
    text: String,
    dirty: bool,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dirty: true,
        }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Last observed stat of a file-backed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    mtime: SystemTime,
    size: u64,
}

/// Content that refers to (does not own) a file on disk.
///
/// Bytes are read fresh on every access; only the last observed mtime/size
/// pair is cached, for change detection.
#[derive(Debug, Clone)]
pub struct FileContent {
    path: PathBuf,
    last: Option<FileStamp>,
}

impl FileContent {
    /// With no prior read, the modified determination is deferred to the
    /// first stat.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stamp(&self) -> Option<FileStamp> {
        let meta = fs::metadata(&self.path).ok()?;
        let mtime = meta.modified().ok()?;
        Some(FileStamp {
            mtime,
            size: meta.len(),
        })
    }

    /// One-shot change check against the last observed stat.
    ///
    /// Deleting the file fires exactly one `true`; once the absence has been
    /// observed, further checks report `false` until the file reappears.
    pub fn is_modified(&mut self) -> bool {
        let prior = self.last.take();
        self.last = self.stamp();
        match (prior, self.last) {
            (None, None) => false,
            (Some(old), Some(new)) => old != new,
            _ => true,
        }
    }

    /// Pure predicate: has the file been written after `threshold`?
    ///
    /// Never consumes the dirty flag. A missing file counts as changed.
    pub fn is_modified_after(&self, threshold: SystemTime) -> bool {
        match fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(mtime) => mtime > threshold,
            Err(_) => true,
        }
    }

    fn read(&self) -> Result<Vec<u8>, ContentError> {
        fs::read(&self.path).map_err(|e| read_err(&self.path, e))
    }
}

/// Content backed by a string whose byte form is its gzip encoding.
///
/// The compressed bytes are computed lazily and cached; updates compare
/// against the original string, never the compressed form.
#[derive(Debug, Clone)]
pub struct GzipTextContent {
    text: String,
    cache: Option<Vec<u8>>,
    dirty: bool,
}

impl GzipTextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cache: None,
            dirty: true,
        }
    }

    /// Replace the text unless it already matches; a matching update leaves
    /// both the cache and the dirty flag alone.
    pub fn set(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text == text {
            return;
        }
        self.text = text;
        self.cache = None;
        self.dirty = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn compressed(&mut self) -> Result<Vec<u8>, ContentError> {
        if let Some(cache) = &self.cache {
            return Ok(cache.clone());
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder
            .write_all(self.text.as_bytes())
            .map_err(|source| ContentError::Compress { source })?;
        let encoded = encoder
            .finish()
            .map_err(|source| ContentError::Compress { source })?;
        self.cache = Some(encoded.clone());
        Ok(encoded)
    }
}

// ---------------------------------------------------------------------------
// DevFsContent
// ---------------------------------------------------------------------------

/// One artifact to be synced, with change tracking.
///
/// A closed set of variants behind one capability surface: [`bytes`] and
/// [`is_modified`].
///
/// [`bytes`]: DevFsContent::bytes
/// [`is_modified`]: DevFsContent::is_modified
#[derive(Debug, Clone)]
pub enum DevFsContent {
    Bytes(BytesContent),
    Text(TextContent),
    File(FileContent),
    GzipText(GzipTextContent),
}

impl DevFsContent {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::Bytes(BytesContent::new(data))
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::Text(TextContent::new(text))
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileContent::new(path))
    }

    pub fn from_gzip_text(text: impl Into<String>) -> Self {
        Self::GzipText(GzipTextContent::new(text))
    }

    /// Produce the bytes to transfer for this entry.
    ///
    /// Fails with [`ContentError::Unreadable`] when a file-backed resource
    /// vanished between the change check and the read.
    pub fn bytes(&mut self) -> Result<Vec<u8>, ContentError> {
        match self {
            Self::Bytes(content) => Ok(content.data.clone()),
            Self::Text(content) => Ok(content.text.clone().into_bytes()),
            Self::File(content) => content.read(),
            Self::GzipText(content) => content.compressed(),
        }
    }

    /// One-shot change check: `true` at most once per state change.
    pub fn is_modified(&mut self) -> bool {
        match self {
            Self::Bytes(content) => std::mem::take(&mut content.dirty),
            Self::Text(content) => std::mem::take(&mut content.dirty),
            Self::File(content) => content.is_modified(),
            Self::GzipText(content) => std::mem::take(&mut content.dirty),
        }
    }
}

impl From<BytesContent> for DevFsContent {
    fn from(content: BytesContent) -> Self {
        Self::Bytes(content)
    }
}

impl From<TextContent> for DevFsContent {
    fn from(content: TextContent) -> Self {
        Self::Text(content)
    }
}

impl From<FileContent> for DevFsContent {
    fn from(content: FileContent) -> Self {
        Self::File(content)
    }
}

impl From<GzipTextContent> for DevFsContent {
    fn from(content: GzipTextContent) -> Self {
        Self::GzipText(content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
