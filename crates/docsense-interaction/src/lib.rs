//! Interaction layer for DocSense.
//!
//! This crate talks to the DocSense backend over HTTP.
//!
//! # Module Structure
//!
//! - `http_backend`: reqwest implementation of `DocumentsBackend`

pub mod http_backend;

// Re-export public API
pub use http_backend::HttpDocumentsBackend;
