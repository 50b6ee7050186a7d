//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use anyhow::Result;
use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{json, Value};
use tempfile::TempDir;

use treeminder::database::connection::setup_database;
use treeminder::database::entities::{parcels, prospects, tenements};
use treeminder::server::app::create_app;

pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// A migrated SQLite database in a temporary directory.
pub async fn setup_test_db() -> Result<(DatabaseConnection, TempDir)> {
    let dir = tempfile::tempdir()?;
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, dir))
}

pub async fn setup_test_app() -> Result<TestApp> {
    let (db, dir) = setup_test_db().await?;
    let app = create_app(db.clone(), None).await?;
    let server = TestServer::new(app)?;

    Ok(TestApp {
        server,
        db,
        _dir: dir,
    })
}

pub fn with_token(request: TestRequest, token: &str) -> TestRequest {
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();
    request.add_header(AUTHORIZATION, value)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

/// Axis-aligned square polygon as GeoJSON geometry text.
pub fn square(west: f64, south: f64, size: f64) -> String {
    let (east, north) = (west + size, south + size);
    json!({
        "type": "Polygon",
        "coordinates": [[[west, south], [east, south], [east, north], [west, north], [west, south]]]
    })
    .to_string()
}

pub fn point(lng: f64, lat: f64) -> String {
    json!({"type": "Point", "coordinates": [lng, lat]}).to_string()
}

pub async fn insert_tenement(
    db: &DatabaseConnection,
    permit_type: &str,
    permit_number: i32,
    permit_status: &str,
    date_expiry: Option<NaiveDate>,
    area: Option<String>,
) -> Result<tenements::Model> {
    Ok(tenements::ActiveModel {
        permit_id: Set(format!("{} {}", permit_type, permit_number)),
        permit_state: Set("QLD".to_string()),
        permit_type: Set(permit_type.to_string()),
        permit_number: Set(permit_number),
        permit_status: Set(permit_status.to_string()),
        date_lodged: Set(Some(days_from_today(-1000 + permit_number as i64 % 100))),
        date_granted: Set(None),
        date_commenced: Set(None),
        date_expiry: Set(date_expiry),
        date_renewed: Set(None),
        ahr_name: Set(Some("Example Resources Pty Ltd".to_string())),
        area_polygons: Set(area),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn insert_parcel(
    db: &DatabaseConnection,
    lot_plan: &str,
    tenure: &str,
    geometry: Option<String>,
) -> Result<parcels::Model> {
    Ok(parcels::ActiveModel {
        lot_plan: Set(lot_plan.to_string()),
        tenure: Set(tenure.to_string()),
        parcel_type: Set(Some("Lot Type Parcel".to_string())),
        area_ha: Set(Some(12.5)),
        geometry: Set(geometry),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn insert_prospect(
    db: &DatabaseConnection,
    project_id: i32,
    name: &str,
    location: Option<String>,
) -> Result<prospects::Model> {
    Ok(prospects::ActiveModel {
        project_id: Set(project_id),
        name: Set(name.to_string()),
        location: Set(location),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub fn feature_ids(collection: &Value) -> Vec<i64> {
    collection["features"]
        .as_array()
        .map(|features| features.iter().filter_map(|f| f["id"].as_i64()).collect())
        .unwrap_or_default()
}

/// Depth-first search for a node by id in a serialized layer tree.
pub fn find_node<'a>(nodes: &'a Value, id: &str) -> Option<&'a Value> {
    nodes.as_array()?.iter().find_map(|node| {
        if node["id"] == id {
            Some(node)
        } else {
            find_node(&node["children"], id)
        }
    })
}
