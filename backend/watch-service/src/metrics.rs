use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder};

static WATCH_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "watch_service_operations_total",
            "Watch operations handled by watch-service, by outcome",
        ),
        &["operation", "outcome"],
    )
    .expect("failed to create watch_service_operations_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register watch_service_operations_total");
    counter
});

static ENGINE_CALL_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "watch_service_engine_duration_seconds",
            "Latency of backing engine calls made by watch-service",
        )
        .buckets(vec![
            0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 1.0,
        ]),
        &["operation", "result"],
    )
    .expect("failed to create watch_service_engine_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register watch_service_engine_duration_seconds");
    histogram
});

pub fn record_operation(operation: &str, outcome: &str) {
    WATCH_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn observe_engine_call(operation: &str, ok: bool, elapsed: Duration) {
    let result = if ok { "ok" } else { "error" };
    ENGINE_CALL_DURATION_SECONDS
        .with_label_values(&[operation, result])
        .observe(elapsed.as_secs_f64());
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
