use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// User-visible failure: a status code and a single `error` message.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a service failure; storage failures are reported with `internal_message`
    /// and the underlying cause only goes to the log.
    pub fn from_service(e: ServiceError, internal_message: &str) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            other => {
                error!(error = %other, "storage failure");
                Self::internal(internal_message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        Self::bad_request("Request body must be a JSON object")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected query string");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected path parameter");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let e = ApiError::from_service(ServiceError::Validation("Product name is required".into()), "x");
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message, "Product name is required");

        let e = ApiError::from_service(ServiceError::not_found("order"), "x");
        assert_eq!(e.status, StatusCode::NOT_FOUND);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = ApiError::from_service(ServiceError::io(std::path::Path::new("product.json"), io), "Error adding product");
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, "Error adding product");
    }
}
