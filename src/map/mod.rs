//! Map layer trees and GeoJSON feature serialization.
//!
//! Everything here is pure: database access is limited to building
//! sea-orm `Select`s and running them through [`feature::fetch_features`].

pub mod bbox;
pub mod catalog;
pub mod colour;
pub mod feature;
pub mod layer;
pub mod parcel;
pub mod prospect;
pub mod tenement;

pub use bbox::BoundingBox;
pub use colour::Colour;
pub use feature::{FeatureSerializer, MapRecord, RecordKind, RecordQuery, RecordSet};
pub use layer::{LayerIcon, LayerNode, LayerStyle};
