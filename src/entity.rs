use std::fmt::Debug;

use crate::id::ContentKey;

/// An entity carrying a content identifier and a cached content length.
///
/// Implementors expose the two fields explicitly; nothing is discovered at
/// runtime. If the content identifier is also the entity's primary key, set
/// [`ContentEntity::CONTENT_ID_IS_PRIMARY_KEY`] so it is never cleared.
pub trait ContentEntity: Debug {
    type ContentId: ContentKey;

    const CONTENT_ID_IS_PRIMARY_KEY: bool = false;

    fn content_id(&self) -> Option<&Self::ContentId>;

    fn set_content_id(&mut self, id: Option<Self::ContentId>);

    fn content_length(&self) -> u64;

    fn set_content_length(&mut self, length: u64);

    /// Clear the content identifier unless it is the primary key.
    fn clear_content_id(&mut self) {
        if Self::CONTENT_ID_IS_PRIMARY_KEY {
            log::trace!("keeping primary key content id of {:?}", self);
            return;
        }
        self.set_content_id(None);
    }
}
