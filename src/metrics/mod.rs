/// Prometheus metrics for the dictionary lookup service.
///
/// All collectors live on one global registry. `init_metrics` registers them
/// and `gather_metrics` renders the text exposition served at `/metrics`.
///
/// # Example
/// ```no_run
/// use llm_dictionary::metrics::LOOKUP_REQUESTS_TOTAL;
///
/// LOOKUP_REQUESTS_TOTAL.with_label_values(&["found"]).inc();
/// ```
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry,
};

const NAMESPACE: &str = "llm_dictionary";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Lookup Metrics
    // ============================================================================

    /// Total lookups handled
    ///
    /// Labels: outcome (exact, found, rejected, failed)
    pub static ref LOOKUP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("lookup_requests_total", "Total number of lookup requests")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create LOOKUP_REQUESTS_TOTAL metric");

    /// End-to-end lookup duration in seconds
    pub static ref LOOKUP_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("lookup_duration_seconds", "Lookup duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0])
    ).expect("Failed to create LOOKUP_DURATION_SECONDS metric");

    // ============================================================================
    // Search Metrics
    // ============================================================================

    /// Batch queries issued by the combination search
    ///
    /// Labels: wave (first, second), status (success, error, timeout)
    pub static ref SEARCH_BATCH_QUERIES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_batch_queries_total", "Total number of combination batch queries")
            .namespace(NAMESPACE),
        &["wave", "status"]
    ).expect("Failed to create SEARCH_BATCH_QUERIES_TOTAL metric");

    /// Searches answered by the exact-key probe
    pub static ref SEARCH_EXACT_MATCHES_TOTAL: Counter = Counter::with_opts(
        Opts::new("search_exact_matches_total", "Total number of exact key matches")
            .namespace(NAMESPACE)
    ).expect("Failed to create SEARCH_EXACT_MATCHES_TOTAL metric");

    // ============================================================================
    // Cache Fill Metrics
    // ============================================================================

    /// Cache fills by result
    ///
    /// Labels: status (created, existing, generator_error, persistence_error)
    pub static ref CACHE_FILL_TOTAL: CounterVec = CounterVec::new(
        Opts::new("cache_fill_total", "Total number of cache fills")
            .namespace(NAMESPACE),
        &["status"]
    ).expect("Failed to create CACHE_FILL_TOTAL metric");

    /// Individual generator calls
    ///
    /// Labels: status (success, error, timeout)
    pub static ref GENERATOR_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("generator_attempts_total", "Total number of document generator calls")
            .namespace(NAMESPACE),
        &["status"]
    ).expect("Failed to create GENERATOR_ATTEMPTS_TOTAL metric");

    /// Generations currently running
    pub static ref IN_FLIGHT_GENERATIONS: Gauge = Gauge::with_opts(
        Opts::new("in_flight_generations", "Number of document generations in progress")
            .namespace(NAMESPACE)
    ).expect("Failed to create IN_FLIGHT_GENERATIONS metric");
}

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Register all collectors with the global registry.
///
/// Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(Box::new(LOOKUP_REQUESTS_TOTAL.clone()))?;
    register(Box::new(LOOKUP_DURATION_SECONDS.clone()))?;

    register(Box::new(SEARCH_BATCH_QUERIES_TOTAL.clone()))?;
    register(Box::new(SEARCH_EXACT_MATCHES_TOTAL.clone()))?;

    register(Box::new(CACHE_FILL_TOTAL.clone()))?;
    register(Box::new(GENERATOR_ATTEMPTS_TOTAL.clone()))?;
    register(Box::new(IN_FLIGHT_GENERATIONS.clone()))?;

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization_is_repeatable() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
    }

    #[test]
    fn test_lookup_metrics() {
        LOOKUP_REQUESTS_TOTAL.with_label_values(&["found"]).inc();

        let value = LOOKUP_REQUESTS_TOTAL.with_label_values(&["found"]).get();
        assert!(value >= 1.0);
    }

    #[test]
    fn test_gather_metrics() {
        init_metrics().unwrap();
        CACHE_FILL_TOTAL.with_label_values(&["created"]).inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("llm_dictionary_cache_fill_total"));
    }
}
