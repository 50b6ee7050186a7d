use axum::{extract::State, http::StatusCode, response::Json};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};
use tracing::warn;

use crate::database::entities::tenements;
use crate::server::app::AppState;

/// Reports service liveness and whether the tenement store answers.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Err(e) = state.db.ping().await {
        warn!("Health check database ping failed: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "treeminder",
                "version": env!("CARGO_PKG_VERSION"),
                "database": "unreachable"
            })),
        );
    }

    let tenement_count = tenements::Entity::find().count(&state.db).await.ok();

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "treeminder",
            "version": env!("CARGO_PKG_VERSION"),
            "database": "ok",
            "tenements": tenement_count
        })),
    )
}
