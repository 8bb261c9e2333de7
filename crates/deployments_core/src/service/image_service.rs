//! Software image use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/edit/delete entry points for image callers.
//! - Generate identities for newly uploaded images.
//!
//! # Invariants
//! - Service APIs never bypass storage validation/persistence contracts.
//! - Each method only requires the capability trait it uses.

use crate::model::image::{ImageId, SoftwareImage, SoftwareImageConstructor};
use crate::repo::contracts::{
    ImageCreator, ImageDeleter, ImageEditor, ImageFinder, ImageGetter, ImageLister,
};
use crate::repo::image_storage::StorageResult;

/// Use-case wrapper over software image storage.
#[derive(Debug, Clone)]
pub struct ImagesService<R> {
    repo: R,
}

impl<R> ImagesService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an image with a generated id and returns that id.
    ///
    /// Returns storage validation or duplicate-key errors unchanged.
    pub fn create_image(&self, constructor: SoftwareImageConstructor) -> StorageResult<ImageId>
    where
        R: ImageCreator,
    {
        let mut image = SoftwareImage::new(constructor);
        self.repo.create_image(&mut image)
    }

    pub fn get_image(&self, id: &str) -> StorageResult<Option<SoftwareImage>>
    where
        R: ImageGetter,
    {
        self.repo.get_image(id)
    }

    /// Looks up the image for an application version and device model.
    pub fn find_image(&self, version: &str, model: &str) -> StorageResult<Option<SoftwareImage>>
    where
        R: ImageFinder,
    {
        self.repo.find_image_by_application_and_model(version, model)
    }

    pub fn list_images(&self) -> StorageResult<Vec<SoftwareImage>>
    where
        R: ImageLister,
    {
        self.repo.list_images()
    }

    /// Replaces name/model/description/checksum of an existing image.
    ///
    /// Returns `false` when `id` is unknown.
    pub fn edit_image(&self, id: &str, constructor: SoftwareImageConstructor) -> StorageResult<bool>
    where
        R: ImageEditor,
    {
        self.repo.edit_image(id, constructor)
    }

    /// Deletes an image; unknown ids succeed.
    pub fn delete_image(&self, id: &str) -> StorageResult<()>
    where
        R: ImageDeleter,
    {
        self.repo.delete_image(id)
    }
}
