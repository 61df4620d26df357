use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::{ids, storage::Record};

use common::types::Message;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductCreated {
    pub id: i64,
    pub message: String,
}

fn product_id(raw: &str) -> Result<i64, ApiError> {
    ids::parse_id(raw).ok_or_else(|| ApiError::bad_request("Invalid product ID"))
}

#[utoipa::path(
    get, path = "/search", tag = "products",
    params(("name" = Option<String>, Query, description = "Case-insensitive substring of the product name")),
    responses(
        (status = 200, description = "Matching products in stored order"),
        (status = 400, description = "Missing name", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Product file unreadable", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Query(q) = query?;
    state
        .products
        .search(q.name.as_deref())
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Internal server error"))
}

#[utoipa::path(
    post, path = "/products", tag = "products",
    request_body = crate::openapi::ProductDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductCreatedDoc),
        (status = 400, description = "Body is not a JSON object", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Write failed", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductCreated>), ApiError> {
    let Json(fields) = payload?;
    let id = state
        .products
        .create(fields)
        .await
        .map_err(|e| ApiError::from_service(e, "Error adding product"))?;
    Ok((
        StatusCode::CREATED,
        Json(ProductCreated { id, message: "Product added successfully".into() }),
    ))
}

/// Merge the body into the product. Answers success even when no product matched.
#[utoipa::path(
    put, path = "/products/{id}", tag = "products",
    params(("id" = i64, Path, description = "Product identifier")),
    request_body = crate::openapi::ProductDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MessageDoc),
        (status = 400, description = "Invalid id or body", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Path(raw_id) = path?;
    let id = product_id(&raw_id)?;
    let Json(patch) = payload?;
    state
        .products
        .update(id, patch)
        .await
        .map_err(|e| ApiError::from_service(e, "Error updating product"))?;
    Ok(Json(Message { message: format!("Product with ID {id} updated successfully.") }))
}

#[utoipa::path(
    delete, path = "/products/{id}", tag = "products",
    params(("id" = i64, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Deleted (also when nothing matched)", body = crate::openapi::MessageDoc),
        (status = 400, description = "Invalid id", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Message>, ApiError> {
    let Path(raw_id) = path?;
    let id = product_id(&raw_id)?;
    state
        .products
        .delete(id)
        .await
        .map_err(|e| ApiError::from_service(e, "Error deleting product"))?;
    Ok(Json(Message { message: format!("Product with ID {id} deleted successfully") }))
}
