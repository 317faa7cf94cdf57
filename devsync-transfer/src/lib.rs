//! # devsync-transfer
//!
//! Resilient delivery of artifact content to the runtime's filesystem
//! namespace. One write contract, two implementations: [`HttpWriter`]
//! (gzip + PUT with throttled retry on connection resets) and
//! [`LocalWriter`] (direct filesystem copy for local/offline builds).

pub mod error;
pub mod transport;
pub mod writer;

pub use error::TransferError;
pub use transport::{HttpTransport, ReqwestTransport, TransportFault};
pub use writer::{DevFsWriter, HttpWriter, LocalWriter, DEFAULT_MAX_RETRIES, DEFAULT_THROTTLE};
