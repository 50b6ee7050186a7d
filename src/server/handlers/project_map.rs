//! Project-scoped map layers. Every handler takes a [`ProjectContext`], so
//! the caller is already known to hold read access to the project.

use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::debug;

use crate::errors::AppResult;
use crate::map::parcel::project_parcel_type_tree;
use crate::map::prospect::prospects_tree;
use crate::map::tenement::map_box_tree;
use crate::map::LayerNode;
use crate::server::app::AppState;
use crate::server::middleware::{ProjectContext, Viewport};
use crate::services::ProjectMapService;

pub async fn project_tenements(
    State(state): State<AppState>,
    ctx: ProjectContext,
    Viewport(bounds): Viewport,
) -> AppResult<Json<Vec<LayerNode>>> {
    let service = ProjectMapService::new(state.db.clone());
    let records = service.project_tenements(ctx.project.id).await?;
    debug!("Project '{}' has {} tenements", ctx.project.slug, records.len());

    Ok(Json(map_box_tree(&records, Utc::now().date_naive(), bounds)))
}

pub async fn project_prospects(
    State(state): State<AppState>,
    ctx: ProjectContext,
    Viewport(bounds): Viewport,
) -> AppResult<Json<Vec<LayerNode>>> {
    let service = ProjectMapService::new(state.db.clone());
    let records = service.project_prospects(ctx.project.id).await?;

    Ok(Json(prospects_tree(&records, bounds)))
}

/// Recomputes the parcels inside the project's tenements, stores that set as
/// the project's parcel associations and returns it grouped by tenure.
pub async fn project_parcels(
    State(state): State<AppState>,
    ctx: ProjectContext,
    Viewport(bounds): Viewport,
) -> AppResult<Json<Vec<LayerNode>>> {
    let service = ProjectMapService::new(state.db.clone());
    let parcels = service.parcels_within_project(ctx.project.id).await?;

    let ids: Vec<i32> = parcels.iter().map(|p| p.id).collect();
    service.reconcile_project_parcels(ctx.project.id, &ids).await?;

    Ok(Json(project_parcel_type_tree(&parcels, bounds)))
}
