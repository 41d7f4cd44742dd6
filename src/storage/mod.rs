pub mod fs;
pub mod gridfs;
pub mod memory;

use std::io::Read;

use crate::Result;

pub use fs::FsBlobStore;
pub use gridfs::{GridFsBlobStore, GridFsReader};
pub use memory::MemoryBlobStore;

/// Client for a store of byte blobs addressed by string location.
pub trait BlobStore: Send + Sync {
    type Reader: Read;

    /// Check whether a blob exists at the location.
    fn exists(&self, location: &str) -> Result<bool>;

    /// Size in bytes of the blob at the location.
    ///
    /// A missing blob is an error of kind [`std::io::ErrorKind::NotFound`].
    fn content_length(&self, location: &str) -> Result<u64>;

    /// Write the whole stream as the blob at the location.
    fn store(&self, location: &str, content: &mut dyn Read) -> Result<()>;

    /// Open the blob for reading, `Ok(None)` if there is nothing stored.
    fn open(&self, location: &str) -> Result<Option<Self::Reader>>;

    /// Delete every blob stored under the location.
    /// Deleting a missing blob succeeds.
    fn delete(&self, location: &str) -> Result<()>;

    fn resource(&self, location: &str) -> Resource<'_, Self>
    where
        Self: Sized,
    {
        Resource::new(self, location)
    }
}

pub(crate) fn not_found(location: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no blob stored at {}", location),
    )
}

/// Handle to a single location in a [`BlobStore`].
pub struct Resource<'a, B: BlobStore> {
    store: &'a B,
    location: String,
}

impl<'a, B: BlobStore> Resource<'a, B> {
    pub fn new(store: &'a B, location: &str) -> Self {
        Self {
            store,
            location: location.to_owned(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Blobs are stored under their location, so this is the same string.
    pub fn filename(&self) -> &str {
        &self.location
    }

    pub fn exists(&self) -> Result<bool> {
        self.store.exists(&self.location)
    }

    pub fn content_length(&self) -> Result<u64> {
        self.store.content_length(&self.location)
    }

    pub fn open(&self) -> Result<Option<B::Reader>> {
        self.store.open(&self.location)
    }

    pub fn write<R: Read>(&self, mut content: R) -> Result<()> {
        self.store.store(&self.location, &mut content)
    }

    pub fn delete(&self) -> Result<()> {
        self.store.delete(&self.location)
    }
}

impl<B: BlobStore> std::fmt::Debug for Resource<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("location", &self.location)
            .finish()
    }
}
