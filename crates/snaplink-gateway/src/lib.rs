//! HTTP API for the snaplink URL shortener.
//!
//! Exposes the [`Shortener`](snaplink_shortener::Shortener) operations as a
//! small JSON API under `/shorten`.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use state::AppState;
