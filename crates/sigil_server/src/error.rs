//! API error mapping.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use sigil_core::ValidationError;
use sigil_store::StoreError;

/// Errors surfaced by API handlers.
///
/// Verification outcomes are never errors; only validation failures,
/// malformed requests, and store problems arrive here. Store
/// unavailability maps to 503, never to a not-found response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Issuance input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Path parameter is not a certificate ID
    #[error("invalid certificate id")]
    InvalidId,
    /// Record store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::Corrupted { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_is_503() {
        let err = ApiError::Store(StoreError::Unavailable {
            reason: "backend down".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_is_422() {
        let err = ApiError::Validation(ValidationError::EmptyName);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unknown_id_is_404() {
        let err = ApiError::Store(StoreError::NotFound {
            id: "abc".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
