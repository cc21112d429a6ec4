//! Process-lifetime handles to uploaded bytes.
//!
//! A [`BlobHandle`] is a move-only token. Releasing it consumes it, so a handle
//! can be released at most once and cannot be used after release.

use std::collections::HashMap;

use derive_more::Display;
use tracing::{debug, warn};

const HANDLE_PREFIX: &str = "blob:hubtree/";

#[derive(Debug, PartialEq, Eq, Hash, Display)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Allocates and releases the handles backing uploaded files.
pub trait HandleRegistry {
    fn allocate(&mut self, bytes: Vec<u8>) -> BlobHandle;
    fn release(&mut self, handle: BlobHandle);
    fn resolve(&self, handle: &BlobHandle) -> Option<&[u8]>;
    fn live_count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct BlobRegistry {
    next: u64,
    blobs: HashMap<String, Vec<u8>>,
}

impl HandleRegistry for BlobRegistry {
    fn allocate(&mut self, bytes: Vec<u8>) -> BlobHandle {
        self.next += 1;
        let key = format!("{HANDLE_PREFIX}{}", self.next);
        debug!("Allocated {} ({} bytes)", key, bytes.len());
        self.blobs.insert(key.clone(), bytes);
        BlobHandle(key)
    }

    fn release(&mut self, handle: BlobHandle) {
        match self.blobs.remove(handle.as_str()) {
            Some(bytes) => debug!("Released {} ({} bytes)", handle, bytes.len()),
            None => warn!("Release of unknown handle {}", handle),
        }
    }

    fn resolve(&self, handle: &BlobHandle) -> Option<&[u8]> {
        self.blobs.get(handle.as_str()).map(Vec::as_slice)
    }

    fn live_count(&self) -> usize {
        self.blobs.len()
    }
}

/// Registry double that records every release.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRegistry {
    inner: BlobRegistry,
    pub released: Vec<String>,
}

#[cfg(test)]
impl HandleRegistry for RecordingRegistry {
    fn allocate(&mut self, bytes: Vec<u8>) -> BlobHandle {
        self.inner.allocate(bytes)
    }

    fn release(&mut self, handle: BlobHandle) {
        self.released.push(handle.as_str().to_string());
        self.inner.release(handle);
    }

    fn resolve(&self, handle: &BlobHandle) -> Option<&[u8]> {
        self.inner.resolve(handle)
    }

    fn live_count(&self) -> usize {
        self.inner.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_produces_distinct_handles() {
        let mut registry = BlobRegistry::default();
        let first = registry.allocate(b"one".to_vec());
        let second = registry.allocate(b"two".to_vec());

        assert_ne!(first, second);
        assert!(first.as_str().starts_with(HANDLE_PREFIX));
        assert_eq!(registry.resolve(&first), Some(&b"one"[..]));
        assert_eq!(registry.resolve(&second), Some(&b"two"[..]));
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_release_frees_bytes() {
        let mut registry = BlobRegistry::default();
        let handle = registry.allocate(vec![0; 16]);
        registry.release(handle);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_release_of_foreign_handle_is_tolerated() {
        let mut registry = BlobRegistry::default();
        registry.release(BlobHandle("blob:elsewhere/1".to_string()));
        assert_eq!(registry.live_count(), 0);
    }
}
