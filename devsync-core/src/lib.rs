//! # devsync-core
//!
//! Content model, clock seam, and telemetry types for the devsync engine.
//!
//! [`DevFsContent`] tracks per-artifact modification state with a one-shot
//! dirty flag; [`UpdateReport`] carries the result of one update cycle.

pub mod clock;
pub mod content;
pub mod error;
pub mod report;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::DevFsContent;
pub use error::ContentError;
pub use report::UpdateReport;
