//! Record sets to GeoJSON feature collections.
//!
//! Each map record type names its geometry column and the attributes copied
//! into `properties`. Serialization is checked against the record kind the
//! caller expects, and that check runs before any query is sent.

use std::fmt;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use sea_orm::{DatabaseConnection, Select};
use serde::Serialize;

use crate::database::entities::{parcels, prospects, tenements};
use crate::errors::{AppError, AppResult};

use super::bbox::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Tenement,
    Parcel,
    Prospect,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Tenement => "tenement",
            RecordKind::Parcel => "parcel",
            RecordKind::Prospect => "prospect",
        };
        write!(f, "{}", name)
    }
}

/// A database row that can be drawn on the map.
pub trait MapRecord {
    const KIND: RecordKind;

    fn record_id(&self) -> i32;

    /// Stored GeoJSON geometry text, if any.
    fn geometry_text(&self) -> Option<&str>;

    fn properties(&self) -> JsonObject;
}

/// Already-fetched records of one kind.
#[derive(Debug, Clone)]
pub enum RecordSet {
    Tenements(Vec<tenements::Model>),
    Parcels(Vec<parcels::Model>),
    Prospects(Vec<prospects::Model>),
}

impl RecordSet {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordSet::Tenements(_) => RecordKind::Tenement,
            RecordSet::Parcels(_) => RecordKind::Parcel,
            RecordSet::Prospects(_) => RecordKind::Prospect,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordSet::Tenements(records) => records.len(),
            RecordSet::Parcels(records) => records.len(),
            RecordSet::Prospects(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pending query over one kind of record.
pub enum RecordQuery {
    Tenements(Select<tenements::Entity>),
    Parcels(Select<parcels::Entity>),
    Prospects(Select<prospects::Entity>),
}

impl RecordQuery {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordQuery::Tenements(_) => RecordKind::Tenement,
            RecordQuery::Parcels(_) => RecordKind::Parcel,
            RecordQuery::Prospects(_) => RecordKind::Prospect,
        }
    }

    pub async fn fetch(self, db: &DatabaseConnection) -> AppResult<RecordSet> {
        let set = match self {
            RecordQuery::Tenements(select) => RecordSet::Tenements(select.all(db).await?),
            RecordQuery::Parcels(select) => RecordSet::Parcels(select.all(db).await?),
            RecordQuery::Prospects(select) => RecordSet::Prospects(select.all(db).await?),
        };
        Ok(set)
    }
}

pub fn ensure_kind(expected: RecordKind, found: RecordKind) -> AppResult<()> {
    if expected != found {
        return Err(AppError::TypeMismatch { expected, found });
    }
    Ok(())
}

/// Runs `query` and serializes the result, rejecting a query of the wrong
/// record kind without touching the database.
pub async fn fetch_features(
    db: &DatabaseConnection,
    expected: RecordKind,
    query: RecordQuery,
    bounds: Option<&BoundingBox>,
) -> AppResult<FeatureCollection> {
    ensure_kind(expected, query.kind())?;

    let records = query.fetch(db).await?;
    tracing::debug!("Fetched {} {} records", records.len(), expected);

    FeatureSerializer::new().within(bounds.copied()).serialize_set(expected, &records)
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSerializer {
    bounds: Option<BoundingBox>,
}

impl FeatureSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop features whose geometry lies outside `bounds`. `None` keeps everything.
    pub fn within(mut self, bounds: Option<BoundingBox>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn serialize_set(&self, expected: RecordKind, set: &RecordSet) -> AppResult<FeatureCollection> {
        ensure_kind(expected, set.kind())?;

        let collection = match set {
            RecordSet::Tenements(records) => self.serialize(records),
            RecordSet::Parcels(records) => self.serialize(records),
            RecordSet::Prospects(records) => self.serialize(records),
        };
        Ok(collection)
    }

    pub fn serialize<R: MapRecord>(&self, records: &[R]) -> FeatureCollection {
        let features = records
            .iter()
            .filter_map(|record| self.feature(record))
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    fn feature<R: MapRecord>(&self, record: &R) -> Option<Feature> {
        let geometry = record
            .geometry_text()
            .and_then(|text| match parse_geometry(text) {
                Ok(geometry) => Some(geometry),
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unreadable geometry on {} {}: {}",
                        R::KIND,
                        record.record_id(),
                        e
                    );
                    None
                }
            });

        if let Some(bounds) = &self.bounds {
            let visible = geometry
                .as_ref()
                .and_then(|g| to_geo(g).ok())
                .map(|g| bounds.intersects(&g))
                .unwrap_or(false);
            if !visible {
                return None;
            }
        }

        Some(Feature {
            bbox: None,
            geometry,
            id: Some(geojson::feature::Id::Number(record.record_id().into())),
            properties: Some(record.properties()),
            foreign_members: None,
        })
    }
}

pub fn parse_geometry(text: &str) -> Result<Geometry, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn to_geo(geometry: &Geometry) -> Result<geo::Geometry<f64>, AppError> {
    geo::Geometry::<f64>::try_from(geometry.value.clone())
        .map_err(|e| AppError::Geometry(e.to_string()))
}

/// Inserts `value` under `key`, serializing dates and options the same way
/// the record's own `Serialize` impl would.
pub(crate) fn insert_property<T: Serialize>(properties: &mut JsonObject, key: &str, value: T) {
    let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
    properties.insert(key.to_string(), value);
}
