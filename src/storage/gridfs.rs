use std::io::{self, ErrorKind, Read};
use std::sync::Arc;

use futures::{AsyncReadExt, AsyncWriteExt, TryStreamExt};
use mongodb::bson::doc;
use mongodb::gridfs::{
    FilesCollectionDocument, GridFsBucket, GridFsDownloadStream,
};
use mongodb::options::{GridFsBucketOptions, GridFsFindOptions};
use mongodb::Client;
use tokio::runtime::{Builder, Runtime};

use super::{not_found, BlobStore};
use crate::config::GridFsConfig;
use crate::{ContentError, Result};

const LOG_PREFIX: &str = "[gridfs]";
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Blocking facade over a MongoDB GridFS bucket.
///
/// Blobs are GridFS files whose filename is the location. GridFS allows
/// several revisions under one filename: reads use the newest revision and
/// deletes remove all of them. Content is streamed in both directions, at
/// most one copy buffer is held in memory by the store itself.
///
/// Every call blocks on a runtime owned by the store, so it must not be
/// used from inside an async context.
pub struct GridFsBlobStore {
    runtime: Arc<Runtime>,
    bucket: GridFsBucket,
    label: String,
}

/// Blocking reader over a GridFS download stream.
pub struct GridFsReader {
    runtime: Arc<Runtime>,
    stream: Option<GridFsDownloadStream>,
}

impl Read for GridFsReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => self.runtime.block_on(stream.read(buf)),
            None => Ok(0),
        }
    }
}

impl Drop for GridFsReader {
    fn drop(&mut self) {
        // the driver cleans up unfinished cursors on a spawned task
        let _guard = self.runtime.enter();
        drop(self.stream.take());
    }
}

impl GridFsBlobStore {
    pub fn connect(config: &GridFsConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("gridfs-blob-store")
            .enable_all()
            .build()?;

        let bucket = runtime.block_on(async {
            let client = Client::with_uri_str(&config.uri).await?;
            let options = GridFsBucketOptions::builder()
                .bucket_name(config.bucket.clone())
                .chunk_size_bytes(config.chunk_size_bytes)
                .build();
            Ok::<_, ContentError>(
                client
                    .database(&config.database)
                    .gridfs_bucket(options),
            )
        })?;

        let label = format!("{}/{}", config.database, config.bucket);
        log::info!("{} connected to bucket {}", LOG_PREFIX, label);
        Ok(Self {
            runtime: Arc::new(runtime),
            bucket,
            label,
        })
    }

    /// `database/bucket` this store writes to.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All revisions stored under the location, newest first.
    fn revisions(
        &self,
        location: &str,
    ) -> Result<Vec<FilesCollectionDocument>> {
        self.runtime.block_on(async {
            let options = GridFsFindOptions::builder()
                .sort(doc! { "uploadDate": -1, "_id": -1 })
                .build();
            let files: Vec<FilesCollectionDocument> = self
                .bucket
                .find(doc! { "filename": location }, options)
                .await?
                .try_collect()
                .await?;
            Ok::<_, ContentError>(files)
        })
    }

    fn newest(
        &self,
        location: &str,
    ) -> Result<Option<FilesCollectionDocument>> {
        self.runtime.block_on(async {
            let options = GridFsFindOptions::builder()
                .sort(doc! { "uploadDate": -1, "_id": -1 })
                .build();
            let mut cursor = self
                .bucket
                .find(doc! { "filename": location }, options)
                .await?;
            Ok::<_, ContentError>(cursor.try_next().await?)
        })
    }
}

impl BlobStore for GridFsBlobStore {
    type Reader = GridFsReader;

    fn exists(&self, location: &str) -> Result<bool> {
        Ok(self.newest(location)?.is_some())
    }

    fn content_length(&self, location: &str) -> Result<u64> {
        match self.newest(location)? {
            Some(file) => Ok(file.length),
            None => Err(not_found(location).into()),
        }
    }

    fn store(&self, location: &str, content: &mut dyn Read) -> Result<()> {
        let written = self.runtime.block_on(async {
            let mut upload = self.bucket.open_upload_stream(location, None);
            let mut buf = vec![0u8; COPY_BUFFER_SIZE];
            let mut written = 0u64;
            loop {
                let n = match content.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        if let Err(abort) = upload.abort().await {
                            log::warn!(
                                "{} failed to abort upload of {}: {}",
                                LOG_PREFIX,
                                location,
                                abort
                            );
                        }
                        return Err(e.into());
                    }
                };
                upload.write_all(&buf[..n]).await?;
                written += n as u64;
            }
            upload.close().await?;
            Ok::<_, ContentError>(written)
        })?;
        log::debug!(
            "{} stored {} bytes at {}",
            LOG_PREFIX,
            written,
            location
        );
        Ok(())
    }

    fn open(&self, location: &str) -> Result<Option<Self::Reader>> {
        let file = match self.newest(location)? {
            Some(file) => file,
            None => return Ok(None),
        };
        let stream = self
            .runtime
            .block_on(self.bucket.open_download_stream(file.id))?;
        Ok(Some(GridFsReader {
            runtime: self.runtime.clone(),
            stream: Some(stream),
        }))
    }

    fn delete(&self, location: &str) -> Result<()> {
        let files = self.revisions(location)?;
        let count = files.len();
        self.runtime.block_on(async {
            for file in files {
                self.bucket.delete(file.id).await?;
            }
            Ok::<_, ContentError>(())
        })?;
        log::debug!(
            "{} deleted {} revisions of {}",
            LOG_PREFIX,
            count,
            location
        );
        Ok(())
    }
}
