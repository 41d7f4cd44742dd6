//! Binds the content of caller-owned entities to blobs kept in a blob store,
//! with MongoDB GridFS as the production backend.
//!
//! An entity exposes a content id and a content length through
//! [`ContentEntity`]. A [`DefaultContentStore`] turns the id into a storage
//! location via [`ContentKey`] and delegates the actual I/O to a
//! [`BlobStore`].

pub mod config;
pub mod entity;
pub mod errors;
pub mod id;
pub mod storage;
pub mod store;

use std::sync::Once;

pub use config::GridFsConfig;
pub use entity::ContentEntity;
pub use errors::{ContentError, Result};
pub use id::ContentKey;
pub use storage::{
    BlobStore, FsBlobStore, GridFsBlobStore, GridFsReader, MemoryBlobStore,
    Resource,
};
pub use store::{AssociativeStore, ContentStore, DefaultContentStore, Store};

pub static INIT: Once = Once::new();

/// Set up logging once per process. Honours `RUST_LOG`.
///
/// Does nothing if a logger is already installed.
pub fn initialize() {
    INIT.call_once(|| {
        let _ = env_logger::try_init();
        log::info!("Initializing mongo-content-store");
    });
}
