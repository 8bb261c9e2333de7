//! Capability traits over software image storage.
//!
//! Callers depend on the narrowest trait they need so tests can substitute
//! a double without reproducing the whole engine.

use crate::model::image::{ImageId, SoftwareImage, SoftwareImageConstructor};
use crate::repo::image_storage::StorageResult;

/// Persists a new image, assigning an id when missing.
pub trait ImageCreator {
    fn create_image(&self, image: &mut SoftwareImage) -> StorageResult<ImageId>;
}

pub trait ImageGetter {
    fn get_image(&self, id: &str) -> StorageResult<Option<SoftwareImage>>;
}

/// Looks an image up by its natural key.
pub trait ImageFinder {
    fn find_image_by_application_and_model(
        &self,
        version: &str,
        model: &str,
    ) -> StorageResult<Option<SoftwareImage>>;
}

/// Removes an image; absent ids are not an error.
pub trait ImageDeleter {
    fn delete_image(&self, id: &str) -> StorageResult<()>;
}

pub trait ImageLister {
    fn list_images(&self) -> StorageResult<Vec<SoftwareImage>>;
}

/// Replaces the constructor part of an existing image.
///
/// Returns `false` when no image with `id` exists.
pub trait ImageEditor {
    fn edit_image(&self, id: &str, constructor: SoftwareImageConstructor) -> StorageResult<bool>;
}
