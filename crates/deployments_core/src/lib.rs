//! Core storage layer for deployable software image metadata.
//! This crate is the single source of truth for image storage invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{Database, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::image::{ImageId, ImageValidationError, SoftwareImage, SoftwareImageConstructor};
pub use repo::contracts::{
    ImageCreator, ImageDeleter, ImageEditor, ImageFinder, ImageGetter, ImageLister,
};
pub use repo::image_storage::{SoftwareImagesStorage, StorageError, StorageResult};
pub use service::image_service::ImagesService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
