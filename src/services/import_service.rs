//! Loads tenements, parcels and prospects from GeoJSON feature collections.
//!
//! Properties are read by the same names the map serializes them under, so a
//! collection exported from a layer endpoint can be imported again.

use std::path::Path;

use chrono::NaiveDate;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tracing::info;

use crate::database::entities::{parcels, prospects, tenements};
use crate::errors::{ImportError, ImportResult};

use super::ProjectMapService;

const INSERT_CHUNK: usize = 200;

pub struct ImportService {
    db: DatabaseConnection,
}

impl ImportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn import_tenements(&self, path: &Path) -> ImportResult<usize> {
        let collection = read_collection(path)?;
        let rows = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| tenement_row(index, feature))
            .collect::<ImportResult<Vec<_>>>()?;

        let count = rows.len();
        let txn = self.db.begin().await?;
        for chunk in rows.chunks(INSERT_CHUNK) {
            tenements::Entity::insert_many(chunk.to_vec())
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        info!("Imported {} tenements from {}", count, path.display());
        Ok(count)
    }

    pub async fn import_parcels(&self, path: &Path) -> ImportResult<usize> {
        let collection = read_collection(path)?;
        let rows = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| parcel_row(index, feature))
            .collect::<ImportResult<Vec<_>>>()?;

        let count = rows.len();
        let txn = self.db.begin().await?;
        for chunk in rows.chunks(INSERT_CHUNK) {
            parcels::Entity::insert_many(chunk.to_vec())
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        info!("Imported {} parcels from {}", count, path.display());
        Ok(count)
    }

    pub async fn import_prospects(&self, path: &Path, project_slug: &str) -> ImportResult<usize> {
        let project = ProjectMapService::new(self.db.clone())
            .find_project(project_slug)
            .await?;

        let collection = read_collection(path)?;
        let rows = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| prospect_row(index, feature, project.id))
            .collect::<ImportResult<Vec<_>>>()?;

        let count = rows.len();
        let txn = self.db.begin().await?;
        for chunk in rows.chunks(INSERT_CHUNK) {
            prospects::Entity::insert_many(chunk.to_vec())
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        info!("Imported {} prospects into project '{}'", count, project_slug);
        Ok(count)
    }
}

pub fn read_collection(path: &Path) -> ImportResult<FeatureCollection> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_collection(&text)
}

pub fn parse_collection(text: &str) -> ImportResult<FeatureCollection> {
    let geojson: GeoJson = text.parse()?;
    Ok(FeatureCollection::try_from(geojson)?)
}

fn tenement_row(index: usize, feature: &Feature) -> ImportResult<tenements::ActiveModel> {
    let props = Props::new(index, feature);

    let permit_type = props.required_string("permit_type")?.to_ascii_uppercase();
    let permit_number = props.required_i32("permit_number")?;
    let permit_id = props
        .string("permit_id")
        .unwrap_or_else(|| format!("{} {}", permit_type, permit_number));

    Ok(tenements::ActiveModel {
        permit_id: Set(permit_id),
        permit_state: Set(props.string("permit_state").unwrap_or_else(|| "QLD".to_string())),
        permit_type: Set(permit_type),
        permit_number: Set(permit_number),
        permit_status: Set(props.required_string("permit_status")?),
        date_lodged: Set(props.date("date_lodged")?),
        date_granted: Set(props.date("date_granted")?),
        date_commenced: Set(props.date("date_commenced")?),
        date_expiry: Set(props.date("date_expiry")?),
        date_renewed: Set(props.date("date_renewed")?),
        ahr_name: Set(props.string("ahr_name")),
        area_polygons: Set(geometry_text(feature)),
        ..Default::default()
    })
}

fn parcel_row(index: usize, feature: &Feature) -> ImportResult<parcels::ActiveModel> {
    let props = Props::new(index, feature);

    Ok(parcels::ActiveModel {
        lot_plan: Set(props.required_string("lot_plan")?),
        tenure: Set(props.required_string("tenure")?),
        parcel_type: Set(props.string("parcel_type")),
        area_ha: Set(props.f64("area_ha")?),
        geometry: Set(geometry_text(feature)),
        ..Default::default()
    })
}

fn prospect_row(index: usize, feature: &Feature, project_id: i32) -> ImportResult<prospects::ActiveModel> {
    let props = Props::new(index, feature);

    Ok(prospects::ActiveModel {
        project_id: Set(project_id),
        name: Set(props.required_string("name")?),
        location: Set(geometry_text(feature)),
        ..Default::default()
    })
}

fn geometry_text(feature: &Feature) -> Option<String> {
    feature
        .geometry
        .as_ref()
        .and_then(|geometry| serde_json::to_string(geometry).ok())
}

/// Typed access to one feature's properties.
struct Props<'a> {
    index: usize,
    properties: Option<&'a JsonObject>,
}

impl<'a> Props<'a> {
    fn new(index: usize, feature: &'a Feature) -> Self {
        Self {
            index,
            properties: feature.properties.as_ref(),
        }
    }

    fn value(&self, key: &str) -> Option<&'a JsonValue> {
        self.properties
            .and_then(|p| p.get(key))
            .filter(|v| !v.is_null())
    }

    fn invalid(&self, field: &'static str, value: &JsonValue) -> ImportError {
        ImportError::InvalidField {
            index: self.index,
            field,
            value: value.to_string(),
        }
    }

    fn string(&self, key: &str) -> Option<String> {
        match self.value(key)? {
            JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn required_string(&self, field: &'static str) -> ImportResult<String> {
        self.string(field).ok_or(ImportError::MissingField {
            index: self.index,
            field,
        })
    }

    fn required_i32(&self, field: &'static str) -> ImportResult<i32> {
        let value = self.value(field).ok_or(ImportError::MissingField {
            index: self.index,
            field,
        })?;
        let parsed = match value {
            JsonValue::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            JsonValue::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(field, value))
    }

    fn f64(&self, field: &'static str) -> ImportResult<Option<f64>> {
        let Some(value) = self.value(field) else {
            return Ok(None);
        };
        let parsed = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.map(Some).ok_or_else(|| self.invalid(field, value))
    }

    /// Accepts `YYYY-MM-DD`, optionally followed by a time part.
    fn date(&self, field: &'static str) -> ImportResult<Option<NaiveDate>> {
        let Some(value) = self.value(field) else {
            return Ok(None);
        };
        let parsed = value
            .as_str()
            .and_then(|s| s.get(..10))
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
        parsed.map(Some).ok_or_else(|| self.invalid(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    const TENEMENTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [146.0, -21.0]},
                "properties": {
                    "permit_type": "epm",
                    "permit_number": "27001",
                    "permit_status": "G",
                    "date_lodged": "2019-03-04",
                    "date_expiry": "2025-03-03T00:00:00",
                    "ahr_name": null
                }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {
                    "permit_id": "ML 100",
                    "permit_state": "QLD",
                    "permit_type": "ML",
                    "permit_number": 100,
                    "permit_status": "A"
                }
            }
        ]
    }"#;

    #[test]
    fn test_tenement_rows() {
        let collection = parse_collection(TENEMENTS).unwrap();
        let rows: Vec<_> = collection
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| tenement_row(i, f).unwrap())
            .collect();

        assert_eq!(rows[0].permit_id, ActiveValue::Set("EPM 27001".to_string()));
        assert_eq!(rows[0].permit_type, ActiveValue::Set("EPM".to_string()));
        assert_eq!(rows[0].permit_state, ActiveValue::Set("QLD".to_string()));
        assert_eq!(rows[0].date_expiry, ActiveValue::Set(NaiveDate::from_ymd_opt(2025, 3, 3)));
        assert_eq!(rows[0].ahr_name, ActiveValue::Set(None));
        assert!(matches!(&rows[0].area_polygons, ActiveValue::Set(Some(text)) if text.contains("Point")));

        assert_eq!(rows[1].permit_id, ActiveValue::Set("ML 100".to_string()));
        assert_eq!(rows[1].area_polygons, ActiveValue::Set(None));
    }

    #[test]
    fn test_missing_field_reports_feature_index() {
        let collection = parse_collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{"permit_type":"EPM","permit_number":1}}
            ]}"#,
        )
        .unwrap();

        let err = tenement_row(0, &collection.features[0]).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingField {
                index: 0,
                field: "permit_status"
            }
        ));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let collection = parse_collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{
                    "permit_type":"EPM","permit_number":1,"permit_status":"G","date_lodged":"04/03/2019"}}
            ]}"#,
        )
        .unwrap();

        let err = tenement_row(0, &collection.features[0]).unwrap_err();
        assert!(matches!(err, ImportError::InvalidField { field: "date_lodged", .. }));
    }

    #[test]
    fn test_non_collection_is_rejected() {
        assert!(parse_collection(r#"{"type":"Point","coordinates":[0.0,0.0]}"#).is_err());
    }
}
