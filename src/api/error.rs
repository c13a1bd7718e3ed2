//! HTTP error mapping

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::aggregates::CartError;
use crate::import::ImportError;
use crate::CatalogError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() { error!(error = %self, "request failed"); }
        (status, Json(json!({ "error": self.to_string(), "code": code }))).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => Self::NotFound(err.to_string()),
            CatalogError::DuplicateReference | CatalogError::DuplicateCategory => Self::Conflict(err.to_string()),
            CatalogError::Validation(_) => Self::BadRequest(err.to_string()),
            CatalogError::StorageError(_) | CatalogError::Database(_) | CatalogError::Config(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(inner) => inner.into(),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self { Self::BadRequest(err.to_string()) }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self { Self::BadRequest(format!("Données invalides : {err}")) }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge("Fichier trop volumineux".into())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}
