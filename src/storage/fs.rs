use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::BlobStore;
use crate::{ContentError, Result};

const TMP_PREFIX: &str = ".tmp-";

/// Scratch file that is removed on drop unless it was persisted.
struct TmpFile {
    file: File,
    path: PathBuf,
    persisted: bool,
}

impl TmpFile {
    fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let filename: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(10)
            .collect();
        let path = dir
            .as_ref()
            .join(format!("{}{}", TMP_PREFIX, filename));
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(Self {
            file,
            path,
            persisted: false,
        })
    }

    fn persist(mut self, destination: &Path) -> Result<()> {
        self.file.sync_data()?;
        fs::rename(&self.path, destination)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Blob store keeping one file per location under a root directory.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("file blob store rooted at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locations map to a single file name directly under the root.
    fn path(&self, location: &str) -> Result<PathBuf> {
        let valid = !location.is_empty()
            && location != "."
            && location != ".."
            && !location.starts_with(TMP_PREFIX)
            && !location.contains(['/', '\\', '\0']);
        if !valid {
            return Err(ContentError::Location(location.to_owned()));
        }
        Ok(self.root.join(location))
    }
}

impl BlobStore for FsBlobStore {
    type Reader = File;

    fn exists(&self, location: &str) -> Result<bool> {
        Ok(self.path(location)?.is_file())
    }

    fn content_length(&self, location: &str) -> Result<u64> {
        Ok(fs::metadata(self.path(location)?)?.len())
    }

    fn store(&self, location: &str, content: &mut dyn Read) -> Result<()> {
        let destination = self.path(location)?;
        let mut tmp = TmpFile::create_in(&self.root)?;
        let written = io::copy(content, &mut tmp.file)?;
        tmp.persist(&destination)?;
        log::trace!("{} bytes written to {}", written, destination.display());
        Ok(())
    }

    fn open(&self, location: &str) -> Result<Option<Self::Reader>> {
        match File::open(self.path(location)?) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, location: &str) -> Result<()> {
        match fs::remove_file(self.path(location)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
