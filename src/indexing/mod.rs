//! Client-side inverted index built from two-word combinations.
//!
//! The store only understands "array contains any of these (≤ 10) values",
//! so phrase search is expressed as: index every stored document under all
//! ordered word pairs of its phrase, then look up a query phrase by its own
//! word pairs, chunked into groups the backend accepts.

mod batch;
mod combinations;

pub use batch::{divide_into_batches, MAX_ARRAY_QUERY_VALUES};
pub use combinations::make_combinations;
