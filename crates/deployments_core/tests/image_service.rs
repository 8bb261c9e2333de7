use deployments_core::{
    Database, ImageCreator, ImageDeleter, ImageEditor, ImageGetter, ImageId, ImageLister,
    ImagesService, SoftwareImage, SoftwareImageConstructor, SoftwareImagesStorage, StorageError,
    StorageResult,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

fn service() -> ImagesService<SoftwareImagesStorage> {
    let storage = SoftwareImagesStorage::new(Database::open_in_memory().unwrap());
    storage.index_storage().unwrap();
    ImagesService::new(storage)
}

#[test]
fn service_creates_and_reads_images_through_storage() {
    let service = service();

    let id = service
        .create_image(SoftwareImageConstructor::new("app-1.0", "bbb"))
        .unwrap();

    let fetched = service.get_image(&id).unwrap().unwrap();
    assert_eq!(fetched.id(), Some(id.as_str()));
    assert_eq!(fetched.name(), "app-1.0");
    assert!(fetched.modified().is_some());

    let found = service.find_image("app-1.0", "bbb").unwrap().unwrap();
    assert_eq!(found, fetched);
    assert_eq!(service.list_images().unwrap().len(), 1);
}

#[test]
fn service_edit_replaces_constructor_and_reports_missing_ids() {
    let service = service();
    let id = service
        .create_image(SoftwareImageConstructor::new("app-1.0", "bbb"))
        .unwrap();

    let mut edited = SoftwareImageConstructor::new("app-1.1", "bbb");
    edited.checksum = Some("abc123".to_string());
    assert!(service.edit_image(&id, edited.clone()).unwrap());

    let fetched = service.get_image(&id).unwrap().unwrap();
    assert_eq!(fetched.constructor, edited);

    assert!(!service.edit_image("missing", edited).unwrap());
    assert!(matches!(
        service
            .edit_image("", SoftwareImageConstructor::new("a", "b"))
            .unwrap_err(),
        StorageError::InvalidId
    ));
}

#[test]
fn service_surfaces_duplicate_and_validation_errors() {
    let service = service();
    service
        .create_image(SoftwareImageConstructor::new("app-1.0", "bbb"))
        .unwrap();

    let duplicate = service
        .create_image(SoftwareImageConstructor::new("app-1.0", "bbb"))
        .unwrap_err();
    assert!(duplicate.is_duplicate_key());

    let invalid = service
        .create_image(SoftwareImageConstructor::new("app-2.0", ""))
        .unwrap_err();
    assert!(matches!(invalid, StorageError::Validation(_)));
}

#[test]
fn service_delete_is_idempotent() {
    let service = service();
    let id = service
        .create_image(SoftwareImageConstructor::new("app-1.0", "bbb"))
        .unwrap();

    service.delete_image(&id).unwrap();
    service.delete_image(&id).unwrap();
    assert!(service.get_image(&id).unwrap().is_none());
    assert!(service.list_images().unwrap().is_empty());
}

/// Test double implementing only the contracts the service needs.
#[derive(Default)]
struct InMemoryImages {
    images: RefCell<BTreeMap<ImageId, SoftwareImage>>,
}

impl ImageCreator for InMemoryImages {
    fn create_image(&self, image: &mut SoftwareImage) -> StorageResult<ImageId> {
        image.validate()?;
        let id = image.id().ok_or(StorageError::InvalidId)?.to_owned();
        self.images.borrow_mut().insert(id.clone(), image.clone());
        Ok(id)
    }
}

impl ImageGetter for InMemoryImages {
    fn get_image(&self, id: &str) -> StorageResult<Option<SoftwareImage>> {
        Ok(self.images.borrow().get(id).cloned())
    }
}

impl ImageLister for InMemoryImages {
    fn list_images(&self) -> StorageResult<Vec<SoftwareImage>> {
        Ok(self.images.borrow().values().cloned().collect())
    }
}

impl ImageDeleter for InMemoryImages {
    fn delete_image(&self, id: &str) -> StorageResult<()> {
        self.images.borrow_mut().remove(id);
        Ok(())
    }
}

impl ImageEditor for InMemoryImages {
    fn edit_image(&self, id: &str, constructor: SoftwareImageConstructor) -> StorageResult<bool> {
        match self.images.borrow_mut().get_mut(id) {
            Some(image) => {
                image.constructor = constructor;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[test]
fn service_works_against_a_test_double() {
    let service = ImagesService::new(InMemoryImages::default());

    let id = service
        .create_image(SoftwareImageConstructor::new("app-1.0", "bbb"))
        .unwrap();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(service.list_images().unwrap().len(), 1);

    assert!(service
        .edit_image(&id, SoftwareImageConstructor::new("app-1.1", "bbb"))
        .unwrap());
    assert_eq!(service.get_image(&id).unwrap().unwrap().name(), "app-1.1");

    service.delete_image(&id).unwrap();
    assert!(service.get_image(&id).unwrap().is_none());
}
