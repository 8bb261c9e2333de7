//! Data access contracts and the images storage engine.
//!
//! # Responsibility
//! - Define narrow capability traits callers and test doubles depend on.
//! - Keep document/SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `SoftwareImage::validate()` before touching storage.
//! - "Record absent" is `None`/`false`/`Ok(())`, never an error.
//! - Malformed input is reported before any session is opened.

pub mod contracts;
pub mod image_storage;
