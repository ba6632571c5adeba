//! Core types and traits for the snaplink URL shortener.
//!
//! This crate provides the shared domain model used by the storage
//! backends, the shortener service and the HTTP gateway.

pub mod error;
pub mod mapping;
pub mod repository;
pub mod shortcode;

pub use error::{CoreError, StorageError};
pub use mapping::{NewMapping, UrlMapping};
pub use repository::{ReadRepository, Repository};
pub use shortcode::ShortCode;
