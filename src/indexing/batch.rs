/// Largest number of values one array-membership query may carry.
///
/// This is a limit of the document backend, not a tuning knob: both the
/// "contains any" filter and the "not in" exclusion filter accept at most
/// this many values.
pub const MAX_ARRAY_QUERY_VALUES: usize = 10;

/// Split `items` into consecutive chunks of at most `batch_size` elements.
///
/// Order is preserved and only the last chunk may be shorter. A `batch_size`
/// of zero is treated as one.
pub fn divide_into_batches<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}
