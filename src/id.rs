use std::fmt::Debug;

use uuid::Uuid;

use crate::{ContentError, Result};

/// A typed content identifier with explicit conversions to and from the
/// string location used as the storage key.
pub trait ContentKey: Clone + Debug {
    /// Produce a fresh random identifier.
    fn generate() -> Self;

    /// The storage key for this identifier.
    fn to_location(&self) -> String;

    /// Parse a storage key back into the typed identifier.
    fn from_location(location: &str) -> Result<Self>;
}

/// Random UUID v4 in its hyphenated form.
pub fn generate_location() -> String {
    Uuid::new_v4().to_string()
}

impl ContentKey for String {
    fn generate() -> Self {
        generate_location()
    }

    fn to_location(&self) -> String {
        self.clone()
    }

    fn from_location(location: &str) -> Result<Self> {
        Ok(location.to_owned())
    }
}

impl ContentKey for Uuid {
    fn generate() -> Self {
        Uuid::new_v4()
    }

    fn to_location(&self) -> String {
        self.to_string()
    }

    fn from_location(location: &str) -> Result<Self> {
        Uuid::parse_str(location).map_err(|e| {
            ContentError::Conversion(format!(
                "{:?} is not a UUID: {}",
                location, e
            ))
        })
    }
}
