use geo::{BoundingRect, Intersects};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Client viewport in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> AppResult<Self> {
        if ![west, south, east, north].iter().all(|v| v.is_finite()) {
            return Err(AppError::InvalidBoundingBox(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        if south > north {
            return Err(AppError::InvalidBoundingBox(format!(
                "south ({}) is above north ({})",
                south, north
            )));
        }
        if west > east {
            return Err(AppError::InvalidBoundingBox(format!(
                "west ({}) is east of east ({})",
                west, east
            )));
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Parses `west,south,east,north`.
    pub fn from_param(param: &str) -> AppResult<Self> {
        let values = param
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::InvalidBoundingBox(format!("'{}': {}", param, e)))?;

        match values.as_slice() {
            [west, south, east, north] => Self::new(*west, *south, *east, *north),
            _ => Err(AppError::InvalidBoundingBox(format!(
                "expected 4 comma separated values, got {}",
                values.len()
            ))),
        }
    }

    pub fn rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::coord! { x: self.west, y: self.south },
            geo::coord! { x: self.east, y: self.north },
        )
    }

    /// Whether the geometry's bounding rectangle overlaps this box.
    pub fn intersects(&self, geometry: &geo::Geometry<f64>) -> bool {
        geometry
            .bounding_rect()
            .map(|rect| self.rect().intersects(&rect))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Body posted by the map widget, built from Leaflet's `map.getBounds()`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportBounds {
    pub north_east: LatLng,
    pub south_west: LatLng,
}

impl TryFrom<ViewportBounds> for BoundingBox {
    type Error = AppError;

    fn try_from(bounds: ViewportBounds) -> Result<Self, Self::Error> {
        BoundingBox::new(
            bounds.south_west.lng,
            bounds.south_west.lat,
            bounds.north_east.lng,
            bounds.north_east.lat,
        )
    }
}
