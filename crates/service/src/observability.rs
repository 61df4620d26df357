use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry), labelled by collection file name.
pub static STORE_LOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_store_loads_total",
        "Total collection loads",
        &["collection"]
    )
    .expect("register store_loads_total")
});

pub static STORE_FALLBACKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_store_fallbacks_total",
        "Loads that fell back to an empty collection",
        &["collection", "reason"]
    )
    .expect("register store_fallbacks_total")
});

pub static STORE_SAVES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_store_saves_total",
        "Total collection saves",
        &["collection"]
    )
    .expect("register store_saves_total")
});

pub static STORE_SAVE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_store_save_errors_total",
        "Collection saves that failed",
        &["collection"]
    )
    .expect("register store_save_errors_total")
});

pub fn encode_metrics() -> (StatusCode, String) {
    // register every family up front
    Lazy::force(&STORE_LOADS_TOTAL);
    Lazy::force(&STORE_FALLBACKS_TOTAL);
    Lazy::force(&STORE_SAVES_TOTAL);
    Lazy::force(&STORE_SAVE_ERRORS_TOTAL);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
