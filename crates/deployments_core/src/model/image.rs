//! Software image domain model.
//!
//! # Responsibility
//! - Define the metadata record describing one deployable software image.
//! - Validate natural-key and optional descriptive fields before persistence.
//!
//! # Invariants
//! - `id` never changes once assigned.
//! - `constructor.name` and `constructor.model` are non-blank.
//! - `modified` is only written by the storage engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Upper bound for every free-text field of an image.
pub const MAX_FIELD_CHARS: usize = 4096;

/// Stable identifier of a software image, persisted as the document `_id`.
pub type ImageId = String;

/// Validation failures raised by [`SoftwareImage::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValidationError {
    /// A required field is empty or whitespace-only, or an optional field
    /// is present but blank.
    BlankField(&'static str),
    /// A field exceeds [`MAX_FIELD_CHARS`].
    FieldTooLong { field: &'static str, max: usize },
    /// The identifier is present but blank.
    BlankId,
}

impl Display for ImageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::BlankId => write!(f, "image id must not be blank"),
        }
    }
}

impl Error for ImageValidationError {}

/// Caller-provided part of an image: everything except identity and
/// persistence metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareImageConstructor {
    /// Application name and version, e.g. `core-image-full-cmdline-1.2`.
    pub name: String,
    /// Target device model the image is built for.
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl SoftwareImageConstructor {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            description: None,
            checksum: None,
        }
    }

    /// Checks natural-key and descriptive fields.
    pub fn validate(&self) -> Result<(), ImageValidationError> {
        validate_required("name", &self.name)?;
        validate_required("model", &self.model)?;
        validate_optional("description", self.description.as_deref())?;
        validate_optional("checksum", self.checksum.as_deref())?;
        Ok(())
    }
}

/// Persisted software image record.
///
/// Field names are part of the storage contract: the unique index is
/// defined over `softwareimageconstructor.name` and
/// `softwareimageconstructor.model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareImage {
    /// `None` until assigned by the caller or at insert time.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ImageId>,
    #[serde(rename = "softwareimageconstructor")]
    pub constructor: SoftwareImageConstructor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
}

impl SoftwareImage {
    /// Creates an image with a freshly generated UUID v4 identifier.
    pub fn new(constructor: SoftwareImageConstructor) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), constructor)
    }

    /// Creates an image with a caller-provided identifier.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: impl Into<ImageId>, constructor: SoftwareImageConstructor) -> Self {
        Self {
            id: Some(id.into()),
            constructor,
            modified: None,
        }
    }

    /// Creates an image whose identifier is assigned at insert time.
    pub fn without_id(constructor: SoftwareImageConstructor) -> Self {
        Self {
            id: None,
            constructor,
            modified: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.constructor.name
    }

    pub fn model(&self) -> &str {
        &self.constructor.model
    }

    /// Assigns a generated identifier when none is set yet.
    pub(crate) fn assign_id_if_missing(&mut self) -> &str {
        self.id.get_or_insert_with(|| Uuid::new_v4().to_string())
    }

    /// Time of the last persistence event, `None` before the first insert.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Records a persistence event. Only the storage engine calls this.
    pub(crate) fn set_modified(&mut self, at: DateTime<Utc>) {
        self.modified = Some(at);
    }

    /// Checks every domain rule an image must satisfy to be persisted.
    pub fn validate(&self) -> Result<(), ImageValidationError> {
        if let Some(id) = self.id.as_deref() {
            if is_blank(id) {
                return Err(ImageValidationError::BlankId);
            }
        }
        self.constructor.validate()
    }
}

/// Returns `true` for empty or whitespace-only input.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn validate_required(field: &'static str, value: &str) -> Result<(), ImageValidationError> {
    if is_blank(value) {
        return Err(ImageValidationError::BlankField(field));
    }
    if value.chars().count() > MAX_FIELD_CHARS {
        return Err(ImageValidationError::FieldTooLong {
            field,
            max: MAX_FIELD_CHARS,
        });
    }
    Ok(())
}

fn validate_optional(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ImageValidationError> {
    match value {
        Some(value) => validate_required(field, value),
        None => Ok(()),
    }
}
