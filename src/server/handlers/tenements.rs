use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use tracing::debug;

use crate::database::entities::tenements;
use crate::errors::{AppError, AppResult};
use crate::map::tenement::{map_box_tree, TenementFilter};
use crate::map::LayerNode;
use crate::server::app::AppState;
use crate::server::middleware::Viewport;

#[derive(Debug, Deserialize)]
pub struct PermitPath {
    pub permit_state: String,
    pub permit_type: String,
    pub permit_number: i32,
}

/// Layer tree for a single permit, e.g. `/map/api/tenements/QLD/EPM/27001/`.
pub async fn permit_tree(
    State(state): State<AppState>,
    Path(permit): Path<PermitPath>,
    Viewport(bounds): Viewport,
) -> AppResult<Json<Vec<LayerNode>>> {
    let base = tenements::Entity::find()
        .filter(tenements::Column::PermitState.eq(permit.permit_state.to_uppercase()))
        .filter(tenements::Column::PermitType.eq(permit.permit_type.to_uppercase()))
        .filter(tenements::Column::PermitNumber.eq(permit.permit_number));
    let records = TenementFilter::new().apply(base).all(&state.db).await?;
    debug!(
        "Found {} tenements for {} {} {}",
        records.len(),
        permit.permit_state,
        permit.permit_type,
        permit.permit_number
    );

    Ok(Json(map_box_tree(&records, Utc::now().date_naive(), bounds)))
}

/// Prospects moved to the project endpoints.
pub async fn deprecated_prospects() -> AppError {
    AppError::NotFound("Permit prospects".to_string())
}
