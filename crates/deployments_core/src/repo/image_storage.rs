//! Software image storage engine.
//!
//! # Responsibility
//! - Execute every persistence operation for software images.
//! - Translate [`DbError::NotFound`] into optional and boolean results.
//! - Provision the unique `(name, model)` index at startup.
//!
//! # Invariants
//! - Each operation opens its own [`Session`](crate::db::Session) and drops
//!   it on every exit path.
//! - Natural-key uniqueness is enforced by the unique index only; there is
//!   no check-then-insert.
//! - Read paths reject invalid persisted documents instead of masking them.
//! - The engine neither logs nor retries failed operations.

use crate::db::keys::StorageNames;
use crate::db::{Database, DbError, IndexSpec};
use crate::model::image::{
    is_blank, ImageId, ImageValidationError, SoftwareImage, SoftwareImageConstructor,
};
use crate::repo::contracts::{
    ImageCreator, ImageDeleter, ImageEditor, ImageFinder, ImageGetter, ImageLister,
};
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StorageResult<T> = Result<T, StorageError>;

/// Error returned by images storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// Identifier argument is empty or blank.
    InvalidId,
    /// Application name/version argument is empty or blank.
    InvalidVersion,
    /// Device model argument is empty or blank.
    InvalidModel,
    /// No image was supplied.
    InvalidImage,
    Validation(ImageValidationError),
    Db(DbError),
    /// A stored document does not decode into a valid image.
    InvalidData(String),
}

impl StorageError {
    /// Returns `true` for errors caused by caller input rather than storage.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidId
                | Self::InvalidVersion
                | Self::InvalidModel
                | Self::InvalidImage
                | Self::Validation(_)
        )
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_duplicate_key())
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId => write!(f, "invalid id"),
            Self::InvalidVersion => write!(f, "invalid version"),
            Self::InvalidModel => write!(f, "invalid model"),
            Self::InvalidImage => write!(f, "invalid image"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted image data: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidId
            | Self::InvalidVersion
            | Self::InvalidModel
            | Self::InvalidImage
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ImageValidationError> for StorageError {
    fn from(value: ImageValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Document-backed storage for [`SoftwareImage`] records.
///
/// Cheap to clone and safe to share across threads: all state lives in the
/// database.
#[derive(Debug, Clone)]
pub struct SoftwareImagesStorage {
    db: Database,
    names: StorageNames,
}

impl SoftwareImagesStorage {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            names: StorageNames::default(),
        }
    }

    /// Ensures the unique `(name, model)` index exists.
    ///
    /// Meant to run once at process startup. The index is built eagerly, so
    /// uniqueness holds from the first write. Re-running is a no-op.
    pub fn index_storage(&self) -> StorageResult<()> {
        let started_at = Instant::now();
        info!(
            "event=index_storage module=repo status=start index={}",
            self.names.unique_name_model_index
        );

        let session = self.db.session()?;
        let keys = [self.names.key_name, self.names.key_model];
        session
            .collection(self.names.collection)
            .ensure_index(&IndexSpec {
                name: self.names.unique_name_model_index,
                keys: &keys,
                unique: true,
            })?;

        info!(
            "event=index_storage module=repo status=ok index={} duration_ms={}",
            self.names.unique_name_model_index,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Returns whether an image with `id` is stored.
    pub fn exists(&self, id: &str) -> StorageResult<bool> {
        if is_blank(id) {
            return Err(StorageError::InvalidId);
        }

        let session = self.db.session()?;
        Ok(session.collection(self.names.collection).contains_id(id)?)
    }

    /// Validates and persists `image`.
    ///
    /// On success the caller's image carries its (possibly generated) id and
    /// the persistence timestamp. Natural-key collisions are reported by the
    /// unique index as a duplicate-key database error.
    pub fn insert(&self, image: Option<&mut SoftwareImage>) -> StorageResult<()> {
        let image = image.ok_or(StorageError::InvalidImage)?;
        self.insert_document(image)?;
        Ok(())
    }

    /// Revalidates and replaces a stored image, refreshing `modified`.
    ///
    /// Returns `false` when no image with the same id exists.
    pub fn update(&self, image: &mut SoftwareImage) -> StorageResult<bool> {
        image.validate()?;
        let id = match image.id() {
            Some(id) => id.to_owned(),
            None => return Err(StorageError::InvalidId),
        };

        let session = self.db.session()?;
        let mut document = image.clone();
        document.set_modified(Utc::now());

        match session
            .collection(self.names.collection)
            .update_id(&id, &document)
        {
            Ok(()) => {
                *image = document;
                Ok(true)
            }
            Err(DbError::NotFound) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn find_by_id(&self, id: &str) -> StorageResult<Option<SoftwareImage>> {
        if is_blank(id) {
            return Err(StorageError::InvalidId);
        }

        let session = self.db.session()?;
        match session
            .collection(self.names.collection)
            .find_id::<SoftwareImage>(id)
        {
            Ok(image) => Ok(Some(checked(image)?)),
            Err(DbError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Finds the image built from application `version` for device `model`.
    ///
    /// At most one image can match given the unique index.
    pub fn find_image_by_application_and_model(
        &self,
        version: &str,
        model: &str,
    ) -> StorageResult<Option<SoftwareImage>> {
        if is_blank(version) {
            return Err(StorageError::InvalidVersion);
        }
        if is_blank(model) {
            return Err(StorageError::InvalidModel);
        }

        let session = self.db.session()?;
        let filter = [(self.names.key_model, model), (self.names.key_name, version)];
        match session
            .collection(self.names.collection)
            .find_one::<SoftwareImage>(&filter)
        {
            Ok(image) => Ok(Some(checked(image)?)),
            Err(DbError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the image with `id`; a no-op when it does not exist.
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        if is_blank(id) {
            return Err(StorageError::InvalidId);
        }

        let session = self.db.session()?;
        match session.collection(self.names.collection).remove_id(id) {
            Ok(()) | Err(DbError::NotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists every stored image. Order is not part of the contract.
    pub fn find_all(&self) -> StorageResult<Vec<SoftwareImage>> {
        let session = self.db.session()?;
        let images = session
            .collection(self.names.collection)
            .find_all::<SoftwareImage>()?;

        images.into_iter().map(checked).collect()
    }

    fn insert_document(&self, image: &mut SoftwareImage) -> StorageResult<ImageId> {
        image.validate()?;

        let session = self.db.session()?;
        let mut document = image.clone();
        let id = document.assign_id_if_missing().to_owned();
        document.set_modified(Utc::now());

        session
            .collection(self.names.collection)
            .insert(&id, &document)?;

        *image = document;
        Ok(id)
    }
}

fn checked(image: SoftwareImage) -> StorageResult<SoftwareImage> {
    let id = match image.id() {
        Some(id) => id.to_owned(),
        None => {
            return Err(StorageError::InvalidData(
                "image document without `_id`".to_string(),
            ))
        }
    };
    image
        .validate()
        .map_err(|err| StorageError::InvalidData(format!("image `{id}`: {err}")))?;
    Ok(image)
}

impl ImageCreator for SoftwareImagesStorage {
    fn create_image(&self, image: &mut SoftwareImage) -> StorageResult<ImageId> {
        self.insert_document(image)
    }
}

impl ImageGetter for SoftwareImagesStorage {
    fn get_image(&self, id: &str) -> StorageResult<Option<SoftwareImage>> {
        self.find_by_id(id)
    }
}

impl ImageFinder for SoftwareImagesStorage {
    fn find_image_by_application_and_model(
        &self,
        version: &str,
        model: &str,
    ) -> StorageResult<Option<SoftwareImage>> {
        SoftwareImagesStorage::find_image_by_application_and_model(self, version, model)
    }
}

impl ImageDeleter for SoftwareImagesStorage {
    fn delete_image(&self, id: &str) -> StorageResult<()> {
        self.delete(id)
    }
}

impl ImageLister for SoftwareImagesStorage {
    fn list_images(&self) -> StorageResult<Vec<SoftwareImage>> {
        self.find_all()
    }
}

impl ImageEditor for SoftwareImagesStorage {
    fn edit_image(&self, id: &str, constructor: SoftwareImageConstructor) -> StorageResult<bool> {
        if is_blank(id) {
            return Err(StorageError::InvalidId);
        }

        let mut image = SoftwareImage::with_id(id, constructor);
        self.update(&mut image)
    }
}
