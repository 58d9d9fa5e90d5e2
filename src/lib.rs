//! Core library for a local file-tagging browser: a persistent tag store
//! keyed by absolute path, a reconciliation pass that repairs tag records
//! after files move to a new directory, and a thumbnail pipeline that
//! renders video previews through an external encoder with bounded
//! concurrency.
//!
//! The presentation layer is not part of this crate; it consumes
//! [`state::AppState`] and the service modules directly.

pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use error::AppError;
pub use state::AppState;
