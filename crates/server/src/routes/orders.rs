use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service::{ids, storage::Record};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub message: String,
    #[serde(rename = "orderId")]
    pub order_id: i64,
}

fn order_id(raw: &str) -> Result<i64, ApiError> {
    ids::parse_id(raw).ok_or_else(|| ApiError::bad_request("Invalid order ID"))
}

/// `{"status": ...}`; the field is left out when the order has none.
#[utoipa::path(
    get, path = "/orders/{id}", tag = "orders",
    params(("id" = i64, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order status"),
        (status = 400, description = "Invalid id", body = crate::openapi::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn status(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let Path(raw_id) = path?;
    let id = order_id(&raw_id)?;
    let found = state
        .orders
        .status(id)
        .await
        .map_err(|e| ApiError::from_service(e, "Internal server error"))?;
    let Some(status) = found else {
        return Err(ApiError::not_found("Order not found"));
    };
    let mut body = Map::new();
    if let Some(s) = status {
        body.insert("status".into(), s);
    }
    Ok(Json(body))
}

#[utoipa::path(
    post, path = "/orders", tag = "orders",
    request_body = crate::openapi::OrderDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::OrderCreatedDoc),
        (status = 400, description = "Body is not a JSON object", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Write failed", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<OrderCreated>, ApiError> {
    let Json(fields) = payload?;
    let order_id = state
        .orders
        .create(fields)
        .await
        .map_err(|e| ApiError::from_service(e, "Error creating order"))?;
    Ok(Json(OrderCreated { order_id }))
}

#[utoipa::path(
    put, path = "/orders/{id}/cancel", tag = "orders",
    params(("id" = i64, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Cancelled (also when nothing matched)", body = crate::openapi::OrderCancelledDoc),
        (status = 400, description = "Invalid order ID", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<OrderCancelled>, ApiError> {
    let Path(raw_id) = path?;
    let id = order_id(&raw_id)?;
    state
        .orders
        .cancel(id)
        .await
        .map_err(|e| ApiError::from_service(e, "Error cancelling order"))?;
    Ok(Json(OrderCancelled { message: "Order cancelled successfully".into(), order_id: id }))
}
