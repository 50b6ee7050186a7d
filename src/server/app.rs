use anyhow::{anyhow, Result};
use axum::{
    extract::State,
    routing::{any, get},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{dashboard, health, map, project_map, tenements};
use crate::views::{DashboardPage, Views};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub views: Views,
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let views = Views::load().map_err(|e| anyhow!("Failed to load templates: {}", e))?;
    let state = AppState { db, views };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()
                .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any)
            .allow_credentials(false),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any)
            .allow_credentials(false),
    };

    let mut app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check));

    for page in DashboardPage::ALL {
        app = app.route(
            page.route(),
            get(move |state: State<AppState>| dashboard::render_page(state, page)),
        );
    }

    let app = app
        // Interactive map
        .route("/map/", get(map::map_home))
        .route("/map/api/tree/", get(map::map_tree).post(map::map_tree))
        .route(
            "/map/api/tenements/",
            get(map::legacy_tenements).post(map::legacy_tenements),
        )
        .route(
            "/map/api/layers/:permit_type/:layer/",
            get(map::layer_features).post(map::layer_features),
        )
        .route(
            "/map/api/tenements/:permit_state/:permit_type/:permit_number/",
            get(tenements::permit_tree).post(tenements::permit_tree),
        )
        .route(
            "/map/api/tenements/:permit_state/:permit_type/:permit_number/prospects/",
            any(tenements::deprecated_prospects),
        )
        // Project layers, behind token auth
        .route(
            "/map/api/project/:slug/tenements/",
            get(project_map::project_tenements).post(project_map::project_tenements),
        )
        .route(
            "/map/api/project/:slug/prospects/",
            get(project_map::project_prospects).post(project_map::project_prospects),
        )
        .route(
            "/map/api/project/:slug/parcels/",
            get(project_map::project_parcels).post(project_map::project_parcels),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}
