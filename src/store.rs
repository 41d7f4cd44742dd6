use std::io::Read;

use crate::entity::ContentEntity;
use crate::id::ContentKey;
use crate::storage::{BlobStore, Resource};
use crate::{ContentError, Result};

/// Access to blobs by content identifier.
pub trait Store {
    type Blobs: BlobStore;

    fn resource<SID: ContentKey>(&self, id: &SID) -> Resource<'_, Self::Blobs>;
}

/// Binding of content identifiers to entities, without touching blobs.
pub trait AssociativeStore<E: ContentEntity>: Store {
    /// Resource the entity points at, `None` if it has no content id.
    fn resource_for(&self, entity: &E) -> Option<Resource<'_, Self::Blobs>>;

    /// Point the entity at `id`, converted to the entity's id type.
    fn associate<SID: ContentKey>(&self, entity: &mut E, id: &SID)
        -> Result<()>;

    /// Drop the entity's content id unless it is the primary key.
    fn unassociate(&self, entity: &mut E);
}

/// Reading and writing the content of entities.
pub trait ContentStore<E: ContentEntity>: AssociativeStore<E> {
    /// Replace the entity's content with `content`.
    ///
    /// An entity without a content id gets a freshly generated one. The
    /// content length recorded on the entity is whatever the store reports
    /// after the write, or `0` if that cannot be determined.
    fn set_content<R: Read>(&self, entity: &mut E, content: R) -> Result<()>;

    /// Stream the entity's content, `Ok(None)` if there is none.
    fn get_content(
        &self,
        entity: &E,
    ) -> Result<Option<<Self::Blobs as BlobStore>::Reader>>;

    /// Delete the entity's content and reset its content fields.
    fn unset_content(&self, entity: &mut E) -> Result<()>;
}

/// The content store over any [`BlobStore`].
#[derive(Debug)]
pub struct DefaultContentStore<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> DefaultContentStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn into_inner(self) -> B {
        self.blobs
    }

    fn location_of<E: ContentEntity>(entity: &E) -> Option<String> {
        entity.content_id().map(ContentKey::to_location)
    }
}

/// Log the failure and wrap it as a store access error.
fn store_access<E: ContentEntity>(
    action: &str,
    entity: &E,
    err: ContentError,
) -> ContentError {
    log::error!(
        "Unexpected error {} content for entity {:?}: {}",
        action.to_lowercase(),
        entity,
        err
    );
    ContentError::store_access(
        format!("{} content for entity {:?}", action, entity),
        err,
    )
}

impl<B: BlobStore> Store for DefaultContentStore<B> {
    type Blobs = B;

    fn resource<SID: ContentKey>(&self, id: &SID) -> Resource<'_, B> {
        self.blobs.resource(&id.to_location())
    }
}

impl<B: BlobStore, E: ContentEntity> AssociativeStore<E>
    for DefaultContentStore<B>
{
    fn resource_for(&self, entity: &E) -> Option<Resource<'_, B>> {
        let location = Self::location_of(entity)?;
        Some(self.blobs.resource(&location))
    }

    fn associate<SID: ContentKey>(
        &self,
        entity: &mut E,
        id: &SID,
    ) -> Result<()> {
        let converted = E::ContentId::from_location(&id.to_location())?;
        log::debug!("associating {:?} with {:?}", entity, converted);
        entity.set_content_id(Some(converted));
        Ok(())
    }

    fn unassociate(&self, entity: &mut E) {
        entity.clear_content_id();
    }
}

impl<B: BlobStore, E: ContentEntity> ContentStore<E>
    for DefaultContentStore<B>
{
    fn set_content<R: Read>(
        &self,
        entity: &mut E,
        mut content: R,
    ) -> Result<()> {
        let location = match Self::location_of(entity) {
            Some(location) => location,
            None => {
                let id = E::ContentId::generate();
                let location = id.to_location();
                entity.set_content_id(Some(id));
                location
            }
        };

        let resource = self.blobs.resource(&location);
        let written = (|| -> Result<()> {
            if resource.exists()? {
                log::debug!("replacing existing content at {}", location);
                resource.delete()?;
            }
            resource.write(&mut content)
        })();
        if let Err(err) = written {
            return Err(store_access("Setting", entity, err));
        }

        let length = resource.content_length().unwrap_or_else(|err| {
            log::debug!(
                "Unable to retrieve content length for {}: {}",
                location,
                err
            );
            0
        });
        entity.set_content_length(length);
        Ok(())
    }

    fn get_content(&self, entity: &E) -> Result<Option<B::Reader>> {
        let resource = match self.resource_for(entity) {
            Some(resource) => resource,
            None => return Ok(None),
        };

        let read = (|| -> Result<Option<B::Reader>> {
            if resource.exists()? {
                resource.open()
            } else {
                Ok(None)
            }
        })();
        read.map_err(|err| store_access("Getting", entity, err))
    }

    fn unset_content(&self, entity: &mut E) -> Result<()> {
        let location = match Self::location_of(entity) {
            Some(location) => location,
            None => return Ok(()),
        };

        let resource = self.blobs.resource(&location);
        let deleted = (|| -> Result<bool> {
            if !resource.exists()? {
                return Ok(false);
            }
            resource.delete()?;
            Ok(true)
        })();

        match deleted {
            Ok(true) => {
                entity.clear_content_id();
                entity.set_content_length(0);
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => Err(store_access("Unsetting", entity, err)),
        }
    }
}
