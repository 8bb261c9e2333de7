//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage contracts into use-case level APIs.
//! - Keep request-handling layers decoupled from storage details.

pub mod image_service;
