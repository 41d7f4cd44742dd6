use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{ContentError, Result};

pub const CONFIG_PATH_VAR: &str = "CONTENT_STORE_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "CONTENT_STORE_CONFIG_JSON";
pub const MONGO_URI_VAR: &str = "CONTENT_STORE_MONGO_URI";
pub const MONGO_DATABASE_VAR: &str = "CONTENT_STORE_MONGO_DATABASE";
pub const GRIDFS_BUCKET_VAR: &str = "CONTENT_STORE_GRIDFS_BUCKET";

/// Connection settings for the GridFS backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridFsConfig {
    pub uri: String,
    pub database: String,
    pub bucket: String,
    pub chunk_size_bytes: Option<u32>,
}

impl Default for GridFsConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_owned(),
            database: "content".to_owned(),
            bucket: "fs".to_owned(),
            chunk_size_bytes: None,
        }
    }
}

impl GridFsConfig {
    /// Load the configuration using environment variables.
    /// Evaluation order:
    /// 1) `$CONTENT_STORE_CONFIG_PATH` (JSON file),
    /// 2) `$CONTENT_STORE_CONFIG_JSON` (inline JSON),
    /// 3) defaults with per-field overrides from
    ///    `$CONTENT_STORE_MONGO_URI`, `$CONTENT_STORE_MONGO_DATABASE`
    ///    and `$CONTENT_STORE_GRIDFS_BUCKET`.
    pub fn load_from_env() -> Result<Self> {
        if let Some(path) = non_blank_var(CONFIG_PATH_VAR) {
            log::debug!("loading GridFS config from {}", path);
            return Self::load_from_file(Path::new(&path));
        }

        if let Some(raw) = non_blank_var(CONFIG_JSON_VAR) {
            let config = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {}", CONFIG_JSON_VAR))?;
            return Ok(config);
        }

        let mut config = Self::default();
        if let Some(uri) = non_blank_var(MONGO_URI_VAR) {
            config.uri = uri;
        }
        if let Some(database) = non_blank_var(MONGO_DATABASE_VAR) {
            config.database = database;
        }
        if let Some(bucket) = non_blank_var(GRIDFS_BUCKET_VAR) {
            config.bucket = bucket;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read GridFS config from {}", path.display())
        })?;
        let config = Self::parse_json(&contents)
            .with_context(|| format!("invalid GridFS config {}", path.display()))?;
        Ok(config)
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ContentError::Config(
                "database name must not be empty".to_owned(),
            ));
        }
        if self.bucket.trim().is_empty() {
            return Err(ContentError::Config(
                "bucket name must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
}
