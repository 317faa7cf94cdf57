//! Writers: deliver a batch of (destination path → content) to a base
//! destination.
//!
//! ## `HttpWriter` — per entry
//!
//! 1. Read the artifact bytes.
//! 2. Gzip them with the fast/low-ratio encoder; content whose byte form
//!    already is the gzip encoding goes on the wire untouched.
//! 3. PUT to `<base URI>/<relative path>`.
//! 4. On a connection reset, sleep the throttle interval and retry the same
//!    PUT, up to the configured ceiling.
//!
//! Both writers report cumulative **uncompressed** bytes delivered.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;

use devsync_core::DevFsContent;

use crate::error::{io_err, TransferError};
use crate::transport::{HttpTransport, TransportFault};

/// Retry ceiling for connection resets. The observed floor is five
/// consecutive resets surviving end-to-end; ten keeps headroom without
/// hiding a dead peer for long.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Delay between retry attempts unless the caller overrides it.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Write contract
// ---------------------------------------------------------------------------

/// One write contract for every transfer strategy.
///
/// The orchestrator invokes whichever writer the caller supplied uniformly;
/// entries are `&mut` because reading compressed-text content fills its
/// lazy cache.
#[async_trait]
pub trait DevFsWriter: Send + Sync {
    /// Deliver every entry; returns cumulative uncompressed bytes written.
    async fn write(
        &self,
        entries: &mut HashMap<String, DevFsContent>,
    ) -> Result<u64, TransferError>;
}

// ---------------------------------------------------------------------------
// HttpWriter
// ---------------------------------------------------------------------------

/// Network writer bound to a namespace base URI.
pub struct HttpWriter {
    transport: Arc<dyn HttpTransport>,
    base_uri: String,
    throttle: Duration,
    max_retries: u32,
}

impl HttpWriter {
    pub fn new(transport: Arc<dyn HttpTransport>, base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_uri,
            throttle: DEFAULT_THROTTLE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the retry policy. A zero throttle makes tests deterministic
    /// and fast.
    pub fn with_retry_policy(mut self, throttle: Duration, max_retries: u32) -> Self {
        self.throttle = throttle;
        self.max_retries = max_retries;
        self
    }

    fn entry_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_uri, path.trim_start_matches('/'))
    }

    async fn put_with_retry(&self, url: &str, body: Vec<u8>) -> Result<(), TransferError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.transport.put(url, body.clone()).await {
                Ok(()) => return Ok(()),
                Err(TransportFault::ConnectionReset) if attempts <= self.max_retries => {
                    tracing::warn!(url, attempt = attempts, "connection reset, retrying PUT");
                    tokio::time::sleep(self.throttle).await;
                }
                Err(TransportFault::ConnectionReset) => {
                    return Err(TransferError::RetriesExhausted {
                        url: url.to_string(),
                        attempts,
                    });
                }
                Err(fault) => {
                    return Err(TransferError::Put {
                        url: url.to_string(),
                        fault,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl DevFsWriter for HttpWriter {
    async fn write(
        &self,
        entries: &mut HashMap<String, DevFsContent>,
    ) -> Result<u64, TransferError> {
        let mut synced: u64 = 0;
        for (path, content) in entries.iter_mut() {
            let bytes = content.bytes()?;
            let uncompressed = logical_len(content, &bytes);
            let body = match content {
                // Already the gzip wire encoding; a second pass would put a
                // double-wrapped payload on the wire.
                DevFsContent::GzipText(_) => bytes,
                _ => gzip_fast(&bytes)?,
            };
            let url = self.entry_url(path);
            self.put_with_retry(&url, body).await?;
            synced += uncompressed;
            tracing::debug!("synced {path} ({uncompressed} bytes)");
        }
        Ok(synced)
    }
}

/// Uncompressed length of an entry, independent of its wire encoding.
fn logical_len(content: &DevFsContent, bytes: &[u8]) -> u64 {
    match content {
        DevFsContent::GzipText(inner) => inner.text().len() as u64,
        _ => bytes.len() as u64,
    }
}

fn gzip_fast(data: &[u8]) -> Result<Vec<u8>, TransferError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder
        .write_all(data)
        .map_err(|source| TransferError::Compress { source })?;
    encoder
        .finish()
        .map_err(|source| TransferError::Compress { source })
}

// ---------------------------------------------------------------------------
// LocalWriter
// ---------------------------------------------------------------------------

/// Local-copy writer for local/offline builds: raw bytes under a base
/// directory, preserving the relative path portion of each destination.
pub struct LocalWriter {
    base_dir: PathBuf,
}

impl LocalWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl DevFsWriter for LocalWriter {
    async fn write(
        &self,
        entries: &mut HashMap<String, DevFsContent>,
    ) -> Result<u64, TransferError> {
        let mut synced: u64 = 0;
        for (path, content) in entries.iter_mut() {
            let bytes = content.bytes()?;
            let dest = self.base_dir.join(path.trim_start_matches('/'));
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            fs::write(&dest, &bytes).map_err(|e| io_err(&dest, e))?;
            synced += logical_len(content, &bytes);
            tracing::info!("wrote: {}", dest.display());
        }
        Ok(synced)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    /// Transport that pops a scripted fault per attempt; an empty script
    /// means success.
    struct ScriptedTransport {
        faults: Mutex<Vec<TransportFault>>,
        attempts: AtomicU32,
        last_body: Mutex<Vec<u8>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(mut faults: Vec<TransportFault>) -> Self {
            // Pop from the back; keep script order natural.
            faults.reverse();
            Self {
                faults: Mutex::new(faults),
                attempts: AtomicU32::new(0),
                last_body: Mutex::new(Vec::new()),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn put(&self, url: &str, body: Vec<u8>) -> Result<(), TransportFault> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            if let Some(fault) = self.faults.lock().unwrap().pop() {
                return Err(fault);
            }
            *self.last_body.lock().unwrap() = body;
            Ok(())
        }
    }

    fn resets(n: usize) -> Vec<TransportFault> {
        (0..n).map(|_| TransportFault::ConnectionReset).collect()
    }

    fn single_entry(path: &str, content: DevFsContent) -> HashMap<String, DevFsContent> {
        let mut entries = HashMap::new();
        entries.insert(path.to_string(), content);
        entries
    }

    #[tokio::test]
    async fn http_writer_five_resets_then_success_still_succeeds() {
        let transport = Arc::new(ScriptedTransport::new(resets(5)));
        let writer = HttpWriter::new(transport.clone(), "http://127.0.0.1:8181/fs")
            .with_retry_policy(Duration::ZERO, DEFAULT_MAX_RETRIES);

        let mut entries = single_entry("lib/main.dart", DevFsContent::from_text("hello"));
        let synced = writer.write(&mut entries).await.expect("write");

        assert_eq!(synced, 5, "synced bytes are the uncompressed length");
        assert_eq!(transport.attempts(), 6, "five failures then one success");
    }

    #[tokio::test]
    async fn http_writer_gives_up_past_the_retry_ceiling() {
        let transport = Arc::new(ScriptedTransport::new(resets(20)));
        let writer = HttpWriter::new(transport.clone(), "http://127.0.0.1:8181/fs")
            .with_retry_policy(Duration::ZERO, 3);

        let mut entries = single_entry("a", DevFsContent::from_text("x"));
        let err = writer.write(&mut entries).await.expect_err("exhausted");
        assert!(matches!(err, TransferError::RetriesExhausted { attempts: 4, .. }));
        assert_eq!(transport.attempts(), 4, "initial attempt plus three retries");
    }

    #[tokio::test]
    async fn http_writer_does_not_retry_non_transient_faults() {
        let transport = Arc::new(ScriptedTransport::new(vec![TransportFault::Status(500)]));
        let writer = HttpWriter::new(transport.clone(), "http://127.0.0.1:8181/fs")
            .with_retry_policy(Duration::ZERO, DEFAULT_MAX_RETRIES);

        let mut entries = single_entry("a", DevFsContent::from_text("x"));
        let err = writer.write(&mut entries).await.expect_err("put failed");
        assert!(matches!(
            err,
            TransferError::Put {
                fault: TransportFault::Status(500),
                ..
            }
        ));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn http_writer_joins_base_uri_and_path_without_double_slashes() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let writer = HttpWriter::new(transport.clone(), "http://host:1234/fs/");

        let mut entries = single_entry("/assets/logo.png", DevFsContent::from_bytes(vec![1, 2]));
        writer.write(&mut entries).await.expect("write");

        let urls = transport.urls.lock().unwrap();
        assert_eq!(urls.as_slice(), ["http://host:1234/fs/assets/logo.png"]);
    }

    #[tokio::test]
    async fn http_writer_uploads_gzip_of_the_content() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let writer = HttpWriter::new(transport.clone(), "http://host/fs");

        let mut entries = single_entry("main", DevFsContent::from_text("payload body"));
        let synced = writer.write(&mut entries).await.expect("write");
        assert_eq!(synced, "payload body".len() as u64);

        let body = transport.last_body.lock().unwrap().clone();
        let mut decoder = GzDecoder::new(body.as_slice());
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).expect("gunzip");
        assert_eq!(decoded, "payload body");
    }

    #[tokio::test]
    async fn http_writer_sends_precompressed_text_without_a_second_gzip_pass() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let writer = HttpWriter::new(transport.clone(), "http://host/fs");

        let manifest = "[{\"family\":\"Roboto\"}]";
        let mut entries = single_entry("FontManifest.json", DevFsContent::from_gzip_text(manifest));
        let synced = writer.write(&mut entries).await.expect("write");
        assert_eq!(
            synced,
            manifest.len() as u64,
            "accounting uses the uncompressed length"
        );

        // One gunzip yields the text directly, so exactly one gzip layer
        // went on the wire.
        let body = transport.last_body.lock().unwrap().clone();
        let mut decoder = GzDecoder::new(body.as_slice());
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).expect("gunzip");
        assert_eq!(decoded, manifest);
    }

    #[tokio::test]
    async fn local_writer_places_files_under_base_dir() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("foo").join("bar").join("devfs");
        let writer = LocalWriter::new(&base);

        let source_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("goodbye.src");
        fs::write(&source, "goodbye").unwrap();

        let mut entries = HashMap::new();
        entries.insert("hello".to_string(), DevFsContent::from_text("hello"));
        entries.insert("goodbye".to_string(), DevFsContent::from_file(&source));

        let synced = writer.write(&mut entries).await.expect("write");
        assert_eq!(synced, ("hello".len() + "goodbye".len()) as u64);
        assert_eq!(fs::read_to_string(base.join("hello")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(base.join("goodbye")).unwrap(), "goodbye");
    }

    #[tokio::test]
    async fn local_writer_creates_nested_parents() {
        let tmp = TempDir::new().unwrap();
        let writer = LocalWriter::new(tmp.path());

        let mut entries = single_entry(
            "assets/fonts/Roboto.ttf",
            DevFsContent::from_bytes(vec![0, 1, 2, 3]),
        );
        writer.write(&mut entries).await.expect("write");
        assert!(tmp.path().join("assets/fonts/Roboto.ttf").exists());
    }

    #[tokio::test]
    async fn local_writer_wraps_source_read_faults() {
        let tmp = TempDir::new().unwrap();
        let writer = LocalWriter::new(tmp.path());

        let mut entries = single_entry(
            "broken",
            DevFsContent::from_file(tmp.path().join("no-such-source")),
        );
        let err = writer.write(&mut entries).await.expect_err("read fault");
        assert!(
            matches!(err, TransferError::Content(_)),
            "raw io::Error must not leak, got {err:?}"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn local_writer_wraps_destination_faults() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let readonly = tmp.path().join("readonly");
        fs::create_dir_all(&readonly).unwrap();
        let mut perms = fs::metadata(&readonly).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly, perms).unwrap();

        let writer = LocalWriter::new(&readonly);
        let mut entries = single_entry("file", DevFsContent::from_text("data"));
        let err = writer.write(&mut entries).await.expect_err("denied");
        assert!(matches!(err, TransferError::Io { .. }));

        let mut perms = fs::metadata(&readonly).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly, perms).unwrap();
    }
}
