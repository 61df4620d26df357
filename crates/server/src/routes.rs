use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod orders;
pub mod products;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    service::observability::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    let products = Router::new()
        .route("/search", get(products::search))
        .route("/products", post(products::create))
        .route("/products/:id", put(products::update).delete(products::delete));

    let orders = Router::new()
        .route("/orders", post(orders::create))
        .route("/orders/:id", get(orders::status))
        .route("/orders/:id/cancel", put(orders::cancel));

    ops.merge(products)
        .merge(orders)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        // one INFO span per request, method and path included
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        // status and latency
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        // 5xx at ERROR
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
