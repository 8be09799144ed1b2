//! Prometheus metrics for wall-service.
//!
//! Feed load and toggle collectors plus the `/metrics` handler.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Duration;

static FEED_LOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "wall_feed_loads_total",
        "Total feed loads by filter and outcome (success/error/cached/empty)",
        &["filter", "outcome"]
    )
    .expect("Failed to register feed loads metric")
});

static FEED_LOAD_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "wall_feed_load_duration_seconds",
        "Duration of feed aggregation",
        &["filter", "sort"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register feed load duration metric")
});

static INTERACTION_TOGGLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "wall_interaction_toggles_total",
        "Total like/bookmark toggles by resulting state",
        &["kind", "state"]
    )
    .expect("Failed to register interaction toggles metric")
});

/// Record a finished feed load
pub fn record_feed_load(filter: &str, outcome: &str) {
    FEED_LOADS_TOTAL.with_label_values(&[filter, outcome]).inc();
}

pub fn record_feed_duration(filter: &str, sort: &str, duration: Duration) {
    FEED_LOAD_DURATION_SECONDS
        .with_label_values(&[filter, sort])
        .observe(duration.as_secs_f64());
}

/// Record a toggle; `active` is the interaction state after the call
pub fn record_toggle(kind: &str, active: bool) {
    let state = if active { "added" } else { "removed" };
    INTERACTION_TOGGLES_TOTAL
        .with_label_values(&[kind, state])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
