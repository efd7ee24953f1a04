//! Prometheus metrics for health-flows-service.
//!
//! Flow, provider and sanitizer metrics. Recording helpers are no-ops until
//! [`init_metrics`] has run, so flows can be exercised without a registry.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{Mutex, OnceLock};

static INIT_LOCK: Mutex<()> = Mutex::new(());

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Flow metrics
pub static FLOW_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static FLOW_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static SANITIZER_REPAIRS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Provider metrics
pub static GENAI_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let flow_requests = IntCounterVec::new(
        Opts::new("flow_requests_total", "Total flow runs by outcome"),
        &["flow", "outcome"],
    )?;

    let flow_duration = HistogramVec::new(
        HistogramOpts::new("flow_duration_seconds", "End-to-end flow duration in seconds")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["flow"],
    )?;

    let repairs = IntCounterVec::new(
        Opts::new(
            "sanitizer_repairs_total",
            "Model output fields replaced or dropped by the sanitizer",
        ),
        &["flow", "repair"],
    )?;

    // type: input, output
    let genai_tokens = IntCounterVec::new(
        Opts::new("genai_tokens_total", "Total tokens processed"),
        &["model", "type"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new("genai_provider_errors_total", "Total AI provider errors"),
        &["provider", "error_type"],
    )?;

    registry.register(Box::new(flow_requests.clone()))?;
    registry.register(Box::new(flow_duration.clone()))?;
    registry.register(Box::new(repairs.clone()))?;
    registry.register(Box::new(genai_tokens.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = FLOW_REQUESTS_TOTAL.set(flow_requests);
    let _ = FLOW_DURATION_SECONDS.set(flow_duration);
    let _ = SANITIZER_REPAIRS_TOTAL.set(repairs);
    let _ = GENAI_TOKENS_TOTAL.set(genai_tokens);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_PROVIDER_ERRORS_TOTAL.set(provider_errors);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a finished flow run.
pub fn record_flow(flow: &str, outcome: &str, duration_secs: f64) {
    if let Some(counter) = FLOW_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[flow, outcome]).inc();
    }
    if let Some(histogram) = FLOW_DURATION_SECONDS.get() {
        histogram.with_label_values(&[flow]).observe(duration_secs);
    }
}

/// Record one sanitizer repair (a defaulted, dropped or overwritten field).
pub fn record_repair(flow: &str, repair: &str) {
    if let Some(counter) = SANITIZER_REPAIRS_TOTAL.get() {
        counter.with_label_values(&[flow, repair]).inc();
    }
}

/// Record token usage.
pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = GENAI_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = GENAI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}
