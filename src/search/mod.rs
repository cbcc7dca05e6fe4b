//! Combination search over stored documents
//!
//! A phrase is looked up in three steps:
//!
//! 1. **Exact probe**: the normalized phrase is tried as a document key.
//! 2. **Single word**: a phrase without combinations is matched against
//!    document keys and plural forms.
//! 3. **Batched combination search**: the phrase's combinations are split
//!    into groups that fit one "contains any" query each. The first wave of
//!    groups runs unoptimized; the remaining groups exclude keys the first
//!    wave already returned.
//!
//! ```text
//! combinations ──► groups of ≤ 10 ──► wave 1 (join_all) ──► merge
//!                                          │
//!                                          ▼ found keys
//!                                     wave 2 (join_all, narrowed) ──► merge
//! ```

mod config;
mod query;
mod result;
mod service;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use query::QueryOptimizer;
pub use result::SearchResult;
pub use service::{SearchOrchestrator, Wave};
