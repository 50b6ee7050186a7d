use axum::{
    extract::{Path, State},
    response::{Html, Json},
};
use chrono::Utc;
use geojson::FeatureCollection;
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::map::catalog::get_map_tree;
use crate::map::feature::fetch_features;
use crate::map::tenement::{PermitType, TenementLayer};
use crate::map::{LayerNode, RecordKind, RecordQuery};
use crate::server::app::AppState;
use crate::server::middleware::Viewport;

pub async fn map_home(State(state): State<AppState>) -> AppResult<Html<String>> {
    Ok(Html(state.views.map_page()?))
}

pub async fn map_tree() -> Json<Vec<LayerNode>> {
    Json(get_map_tree())
}

/// Kept for old clients; tenements are served per layer now.
pub async fn legacy_tenements() -> Json<Vec<Value>> {
    Json(Vec::new())
}

/// One catalog leaf, e.g. `/map/api/layers/epm/approaching-expiry/`.
pub async fn layer_features(
    State(state): State<AppState>,
    Path((permit_type, layer)): Path<(String, String)>,
    Viewport(bounds): Viewport,
) -> AppResult<Json<FeatureCollection>> {
    let (permit_type, layer) = resolve_layer(&permit_type, &layer)?;
    let today = Utc::now().date_naive();

    let query = RecordQuery::Tenements(layer.filter(permit_type, today).query());
    let features = fetch_features(&state.db, RecordKind::Tenement, query, bounds.as_ref()).await?;

    Ok(Json(features))
}

fn resolve_layer(permit_type: &str, layer: &str) -> AppResult<(PermitType, TenementLayer)> {
    let not_found = || AppError::NotFound(format!("Layer '{}/{}'", permit_type, layer));

    let parsed_type = PermitType::parse(permit_type).ok_or_else(not_found)?;
    let parsed_layer = TenementLayer::parse(layer)
        .filter(|l| TenementLayer::for_type(parsed_type).contains(l))
        .ok_or_else(not_found)?;

    Ok((parsed_type, parsed_layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_layer() {
        assert_eq!(
            resolve_layer("epm", "approaching-expiry").unwrap(),
            (PermitType::Epm, TenementLayer::ApproachingExpiry)
        );
        assert_eq!(
            resolve_layer("epc", "granted").unwrap(),
            (PermitType::Epc, TenementLayer::Granted)
        );
        assert!(matches!(resolve_layer("ml", "approaching-expiry"), Err(AppError::NotFound(_))));
        assert!(matches!(resolve_layer("xyz", "granted"), Err(AppError::NotFound(_))));
    }
}
