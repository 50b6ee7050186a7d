use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::Method,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::map::bbox::{BoundingBox, ViewportBounds};

/// The client's visible map area, if it sent one.
///
/// POST bodies carry `{"northEast": {...}, "southWest": {...}}`; GET callers
/// may pass `?bbox=west,south,east,north`. An empty body and no query both
/// mean unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport(pub Option<BoundingBox>);

#[derive(Deserialize)]
struct BboxQuery {
    bbox: Option<String>,
}

fn from_query(req: &Request) -> Result<Option<BoundingBox>, AppError> {
    let Query(query) = Query::<BboxQuery>::try_from_uri(req.uri())
        .map_err(|e| AppError::InvalidBoundingBox(e.body_text()))?;

    query
        .bbox
        .filter(|param| !param.trim().is_empty())
        .map(|param| BoundingBox::from_param(&param))
        .transpose()
}

pub fn from_body(body: &[u8]) -> Result<Option<BoundingBox>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let bounds: Option<ViewportBounds> =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidBoundingBox(e.to_string()))?;
    bounds.map(BoundingBox::try_from).transpose()
}

#[async_trait]
impl<S> FromRequest<S> for Viewport
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let from_uri = from_query(&req)?;
        if req.method() != Method::POST {
            return Ok(Viewport(from_uri));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidBoundingBox(e.body_text()))?;

        Ok(Viewport(from_body(&body)?.or(from_uri)))
    }
}
