use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use reunion_core::community::CommunityError;
use reunion_core::geo::GeoError;

use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Unavailable(m) | Self::Internal(m) => {
                write!(f, "{m}")
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            Self::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
            Self::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<GeoError> for AppError {
    fn from(e: GeoError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<CommunityError> for AppError {
    fn from(e: CommunityError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(m) => Self::NotFound(m),
            StoreError::Unavailable(detail) => {
                tracing::error!(%detail, "Store unavailable");
                Self::Unavailable("Storage temporarily unavailable".to_string())
            },
            StoreError::Query(detail) => {
                tracing::error!(%detail, "Store query failed");
                Self::Internal("Storage error".to_string())
            },
        }
    }
}
