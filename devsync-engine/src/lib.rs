//! # devsync-engine
//!
//! Incremental artifact synchronization for a running app: create a
//! runtime-side namespace ([`DevFs`]), drive repeated update cycles
//! ([`DevFsUpdater`]) that overlap compilation with asset-bundle
//! preparation, and push only what changed through a pluggable writer.
//!
//! Session shape: [`DevFs::create`] once, then `update()` per reload,
//! then [`DevFs::destroy`] at teardown.

pub mod bundle;
pub mod compiler;
pub mod devfs;
pub mod error;
pub mod rpc;
pub mod updater;

pub use bundle::{AssetBundle, BundleError};
pub use compiler::{CompileError, CompileRequest, CompileResult, Recompiler};
pub use devfs::DevFs;
pub use error::EngineError;
pub use rpc::{RpcError, RuntimeRpc};
pub use updater::{DevFsUpdater, UpdateParams};
