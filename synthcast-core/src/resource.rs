//! Read-only resource store for bundled media assets
//!
//! Assets are addressed by logical paths of the form `resources/<name>.<ext>`.
//! Opening a path yields a scoped [`ResourceHandle`]; the handle is released
//! when dropped, whichever way the caller exits.

use crate::error::{SynthcastError, SynthcastResult};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{debug, trace};

/// Prefix shared by every bundled asset path
pub const RESOURCE_PREFIX: &str = "resources/";

/// Build the logical path for a bundled asset
pub fn resource_path(name: &str, ext: &str) -> String {
    format!("{}{}.{}", RESOURCE_PREFIX, name, ext)
}

/// Read-only mapping from logical path to byte stream
pub trait ResourceStore: Send + Sync + std::fmt::Debug {
    /// Open a resource for reading
    fn open(&self, path: &str) -> SynthcastResult<ResourceHandle>;

    /// Probe whether a resource exists without opening it
    fn exists(&self, path: &str) -> bool;
}

/// Scoped read handle over a single resource
#[derive(Debug)]
pub struct ResourceHandle {
    path: String,
    reader: Cursor<Bytes>,
    metrics: Option<Arc<RwLock<StoreMetrics>>>,
}

impl ResourceHandle {
    /// Create an untracked handle over a blob
    pub fn new(path: impl Into<String>, data: Bytes) -> Self {
        Self {
            path: path.into(),
            reader: Cursor::new(data),
            metrics: None,
        }
    }

    fn tracked(path: &str, data: Bytes, metrics: Arc<RwLock<StoreMetrics>>) -> Self {
        Self {
            path: path.to_string(),
            reader: Cursor::new(data),
            metrics: Some(metrics),
        }
    }

    /// Logical path this handle was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Total size of the resource in bytes
    pub fn len(&self) -> usize {
        self.reader.get_ref().len()
    }

    /// Whether the resource is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the remainder of the resource into a contiguous buffer
    pub fn read_remaining(&mut self) -> Bytes {
        let start = self.reader.position() as usize;
        let data = self.reader.get_ref().slice(start..);
        self.reader.set_position(self.len() as u64);
        data
    }
}

impl Read for ResourceHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        if let Some(metrics) = self.metrics.take() {
            let mut metrics = metrics.write();
            metrics.open_handles = metrics.open_handles.saturating_sub(1);
        }
        trace!(path = %self.path, "Released resource handle");
    }
}

/// Store access counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    /// Successful opens
    pub opens: u64,
    /// Opens or probes of paths not in the store
    pub misses: u64,
    /// Handles currently alive
    pub open_handles: u64,
}

/// In-memory named-blob store
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, Bytes>,
    metrics: Arc<RwLock<StoreMetrics>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob under a logical path
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.blobs.insert(path.into(), data.into());
    }

    /// Builder-style variant of [`MemoryStore::insert`]
    pub fn with_resource(mut self, path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    /// Remove a blob, returning it if present
    pub fn remove(&mut self, path: &str) -> Option<Bytes> {
        self.blobs.remove(path)
    }

    /// Number of blobs held
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// List stored paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Snapshot of the access counters
    pub fn metrics(&self) -> StoreMetrics {
        self.metrics.read().clone()
    }
}

impl ResourceStore for MemoryStore {
    fn open(&self, path: &str) -> SynthcastResult<ResourceHandle> {
        match self.blobs.get(path) {
            Some(data) => {
                {
                    let mut metrics = self.metrics.write();
                    metrics.opens += 1;
                    metrics.open_handles += 1;
                }
                debug!(path, size = data.len(), "Opened resource");
                Ok(ResourceHandle::tracked(path, data.clone(), self.metrics.clone()))
            }
            None => {
                self.metrics.write().misses += 1;
                Err(SynthcastError::ResourceNotFound {
                    path: path.to_string(),
                })
            }
        }
    }

    fn exists(&self, path: &str) -> bool {
        let found = self.blobs.contains_key(path);
        if !found {
            self.metrics.write().misses += 1;
        }
        found
    }
}

impl<S: ResourceStore + ?Sized> ResourceStore for Arc<S> {
    fn open(&self, path: &str) -> SynthcastResult<ResourceHandle> {
        (**self).open(path)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}
