//! Asset-bundle collaborator seam.

use std::collections::HashMap;

use thiserror::Error;

use devsync_core::DevFsContent;

#[derive(Debug, Error)]
#[error("bundle build failed: {0}")]
pub struct BundleError(pub String);

/// A buildable mapping of destination paths to artifact content.
///
/// The orchestrator only reads `entries_mut()` after `build()`; entries
/// whose one-shot modified flag fires are included in the transfer set.
pub trait AssetBundle: Send {
    fn needs_build(&self) -> bool;

    /// Build or refresh the bundle contents.
    fn build(&mut self) -> Result<(), BundleError>;

    fn entries_mut(&mut self) -> &mut HashMap<String, DevFsContent>;
}
