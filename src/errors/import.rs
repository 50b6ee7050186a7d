//! Errors raised while loading GeoJSON files into the record store.

use thiserror::Error;

use super::AppError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Feature {index}: missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Feature {index}: invalid value for '{field}': {value}")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type ImportResult<T> = Result<T, ImportError>;
