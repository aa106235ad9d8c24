//! Prometheus metrics for pulse-social.
//!
//! Exposes content-operation collectors and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Content mutations segmented by entity and action.
    pub static ref CONTENT_OPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "pulse_content_operations_total",
        "Content mutations segmented by entity and action",
        &["entity", "action"]
    )
    .expect("failed to register pulse_content_operations_total");

    /// Like toggles segmented by target kind and outcome.
    pub static ref LIKE_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "pulse_like_toggles_total",
        "Like toggles segmented by target kind and outcome",
        &["target", "outcome"]
    )
    .expect("failed to register pulse_like_toggles_total");
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
