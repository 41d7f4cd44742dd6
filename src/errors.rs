use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContentError>;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Invalid location: {0}")]
    Location(String),
    #[error("Conversion error: {0}")]
    Conversion(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Store access error: {context}")]
    StoreAccess {
        context: String,
        #[source]
        source: Box<ContentError>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ContentError {
    pub fn store_access(context: String, source: ContentError) -> Self {
        Self::StoreAccess {
            context,
            source: Box::new(source),
        }
    }

    pub fn is_store_access(&self) -> bool {
        matches!(self, Self::StoreAccess { .. })
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn store_access_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ContentError::store_access(
            "Setting content for entity Doc".to_owned(),
            io.into(),
        );

        assert!(err.is_store_access());
        assert_eq!(
            err.to_string(),
            "Store access error: Setting content for entity Doc"
        );
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "IO error: disk gone");
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err: ContentError = serde_json::from_str::<u32>("nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, ContentError::Config(_)));
        assert!(!err.is_store_access());
    }
}
