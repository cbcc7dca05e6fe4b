pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::processing::LookupProcessor;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<LookupProcessor>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(processor: Arc<LookupProcessor>) -> Self {
        Self {
            processor,
            started_at: Instant::now(),
        }
    }
}
