//! # synthcast Core
//!
//! Shared foundations for the synthetic media spec selector: the error type,
//! the read-only resource store that bundled assets are served from, and the
//! rotation counters that spread concurrent publishers across content.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod resource;
pub mod rotation;

// Re-export main types
pub use error::{ErrorCategory, SynthcastError, SynthcastResult};
pub use resource::{
    resource_path, MemoryStore, ResourceHandle, ResourceStore, StoreMetrics, RESOURCE_PREFIX,
};
pub use rotation::RotationCounter;
