//! Dictionary lookup service.
//!
//! Words and phrases are normalized, matched against stored documents through
//! an inverted index of two-word combinations, and generated on demand by an
//! external generator when nothing related is stored yet.

pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod indexing;
pub mod metrics;
pub mod models;
pub mod processing;
pub mod search;
pub mod state;

pub use error::{AppError, ErrorKind, LookupError, Result};
