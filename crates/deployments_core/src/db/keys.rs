//! Storage names shared by every reader and writer of image documents.
//!
//! Document keys mirror the serde field names of
//! [`SoftwareImage`](crate::model::image::SoftwareImage); the unique index
//! is defined over them, so they must be kept in sync with that structure.

/// Logical database name; the file stem of on-disk databases.
pub const DATABASE_NAME: &str = "deployment_service";

/// Collection holding software image documents.
pub const COLLECTION_IMAGES: &str = "images";

pub const STORAGE_KEY_SOFTWARE_IMAGE_ID: &str = "_id";
pub const STORAGE_KEY_SOFTWARE_IMAGE_NAME: &str = "softwareimageconstructor.name";
pub const STORAGE_KEY_SOFTWARE_IMAGE_MODEL: &str = "softwareimageconstructor.model";

/// Unique composite index over (name, model).
pub const INDEX_UNIQUE_NAME_VERSION: &str = "uniqueNameVersionIndex";

/// Names the images engine resolves once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageNames {
    pub collection: &'static str,
    pub key_name: &'static str,
    pub key_model: &'static str,
    pub unique_name_model_index: &'static str,
}

impl Default for StorageNames {
    fn default() -> Self {
        Self {
            collection: COLLECTION_IMAGES,
            key_name: STORAGE_KEY_SOFTWARE_IMAGE_NAME,
            key_model: STORAGE_KEY_SOFTWARE_IMAGE_MODEL,
            unique_name_model_index: INDEX_UNIQUE_NAME_VERSION,
        }
    }
}
