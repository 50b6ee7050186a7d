//! Error types for the map and dashboard endpoints
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl turns
//! each variant into a status code and a small JSON body:
//!
//! ```json
//! { "error": "not_found", "message": "Project 'alpha' not found" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::map::feature::RecordKind;

pub mod import;

pub use import::{ImportError, ImportResult};

#[derive(Error, Debug)]
pub enum AppError {
    /// A serializer was handed records of another kind
    #[error("Expected a {expected} record set, got {found}")]
    TypeMismatch {
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Missing permission '{0}'")]
    Forbidden(String),

    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidBoundingBox(_) => StatusCode::BAD_REQUEST,
            AppError::TypeMismatch { .. }
            | AppError::Geometry(_)
            | AppError::Template(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::TypeMismatch { .. } => "type_mismatch",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidBoundingBox(_) => "invalid_bounding_box",
            AppError::Geometry(_) => "geometry",
            AppError::Template(_) => "template",
            AppError::Database(_) => "database",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
