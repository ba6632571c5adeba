//! URL shortener service implementation.
//!
//! This crate provides the short code [`Allocator`], the [`Shortener`]
//! trait consumed by the HTTP layer, and its repository-backed
//! implementation [`ShortenerService`].

pub mod allocator;
pub mod error;
pub mod service;
pub mod shortener;

pub use allocator::Allocator;
pub use error::{Result, ShortenerError};
pub use service::{ShortenerService, ShortenerSettings};
pub use shortener::Shortener;
