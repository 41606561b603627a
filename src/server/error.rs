//! Mapping of catalog errors onto HTTP responses.

use crate::catalog_store::{CatalogError, ValidationError};
use crate::server::metrics::record_error;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

/// Unparseable bodies are reported like any other invalid payload.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(CatalogError::Validation(ValidationError::MalformedPayload {
            reason: rejection.body_text(),
        }))
    }
}

fn status_for(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::DuplicateKey(_) | CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(&err);
        let kind = err.kind();
        record_error(kind);

        let message = match &err {
            CatalogError::Storage(e) => {
                error!("Storage failure: {}", e);
                "Internal storage error".to_string()
            }
            other => {
                warn!("Request failed ({}): {}", kind, other);
                other.to_string()
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                kind: kind.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
