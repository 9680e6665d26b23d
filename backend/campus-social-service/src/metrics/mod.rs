//! Prometheus metrics for campus-social-service.
//!
//! Exposes toggle and comment-tree collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Toggle operations segmented by kind (like, follow) and outcome.
    pub static ref SOCIAL_TOGGLE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "social_toggle_total",
        "Membership toggles segmented by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("failed to register social_toggle_total");

    /// Time spent assembling comment forests (excludes store round-trips).
    pub static ref COMMENT_TREE_BUILD_SECONDS: Histogram = register_histogram!(
        "comment_tree_build_seconds",
        "Comment forest assembly duration"
    )
    .expect("failed to register comment_tree_build_seconds");

    /// Comments placed into served forests.
    pub static ref COMMENT_TREE_NODES_TOTAL: IntCounter = register_int_counter!(
        "comment_tree_nodes_total",
        "Comments placed into served comment forests"
    )
    .expect("failed to register comment_tree_nodes_total");
}

/// Record a toggle result. `outcome` is e.g. `added`, `removed`, `rejected`.
pub fn record_toggle(kind: &str, outcome: &str) {
    SOCIAL_TOGGLE_TOTAL.with_label_values(&[kind, outcome]).inc();
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
