//! Domain model for deployable software image metadata.
//!
//! # Responsibility
//! - Define the canonical record persisted by the images storage engine.
//! - Own the validation rules every write path must pass.
//!
//! # Invariants
//! - Every persisted image carries a stable `ImageId`.
//! - The `(name, model)` pair identifies an image across the whole collection.

pub mod image;
