use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{PoisonError, RwLock};

use super::{not_found, BlobStore};
use crate::Result;

/// Blob store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    type Reader = Cursor<Vec<u8>>;

    fn exists(&self, location: &str) -> Result<bool> {
        let blobs = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.contains_key(location))
    }

    fn content_length(&self, location: &str) -> Result<u64> {
        let blobs = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match blobs.get(location) {
            Some(data) => Ok(data.len() as u64),
            None => Err(not_found(location).into()),
        }
    }

    fn store(&self, location: &str, content: &mut dyn Read) -> Result<()> {
        let mut data = vec![];
        content.read_to_end(&mut data)?;
        log::trace!("storing {} bytes at {}", data.len(), location);
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.to_owned(), data);
        Ok(())
    }

    fn open(&self, location: &str) -> Result<Option<Self::Reader>> {
        let blobs = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(location).cloned().map(Cursor::new))
    }

    fn delete(&self, location: &str) -> Result<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(location);
        Ok(())
    }
}
