//! Cadastral parcels and the per-project parcel tree.

use geojson::JsonObject;

use crate::database::entities::parcels;

use super::bbox::BoundingBox;
use super::colour::Colour;
use super::feature::{insert_property, FeatureSerializer, MapRecord, RecordKind};
use super::layer::LayerNode;

/// Tenure classes shown as separate parcel layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenureClass {
    Freehold,
    Leasehold,
    Reserve,
    StateLand,
    Other,
}

impl TenureClass {
    pub const ALL: [TenureClass; 5] = [
        TenureClass::Freehold,
        TenureClass::Leasehold,
        TenureClass::Reserve,
        TenureClass::StateLand,
        TenureClass::Other,
    ];

    /// Classifies a cadastre tenure code or name, e.g. `FH` or `Lands Lease`.
    pub fn classify(tenure: &str) -> Self {
        match tenure.trim().to_ascii_uppercase().as_str() {
            "FH" | "FREEHOLD" => TenureClass::Freehold,
            "LL" | "LEASEHOLD" | "LANDS LEASE" => TenureClass::Leasehold,
            "RE" | "RESERVE" | "NP" | "NATIONAL PARK" | "SF" | "STATE FOREST" => TenureClass::Reserve,
            "SL" | "STATE LAND" | "USL" | "UNALLOCATED STATE LAND" => TenureClass::StateLand,
            _ => TenureClass::Other,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            TenureClass::Freehold => "freehold",
            TenureClass::Leasehold => "leasehold",
            TenureClass::Reserve => "reserve",
            TenureClass::StateLand => "state_land",
            TenureClass::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TenureClass::Freehold => "Freehold",
            TenureClass::Leasehold => "Leasehold",
            TenureClass::Reserve => "Reserve",
            TenureClass::StateLand => "State Land",
            TenureClass::Other => "Other",
        }
    }

    pub fn colour(&self) -> Colour {
        match self {
            TenureClass::Freehold => Colour::Orange,
            TenureClass::Leasehold => Colour::Teal,
            TenureClass::Reserve => Colour::Brown,
            TenureClass::StateLand => Colour::Maroon,
            TenureClass::Other => Colour::Black,
        }
    }
}

impl MapRecord for parcels::Model {
    const KIND: RecordKind = RecordKind::Parcel;

    fn record_id(&self) -> i32 {
        self.id
    }

    fn geometry_text(&self) -> Option<&str> {
        self.geometry.as_deref()
    }

    fn properties(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        insert_property(&mut properties, "lot_plan", &self.lot_plan);
        insert_property(&mut properties, "tenure", &self.tenure);
        insert_property(&mut properties, "parcel_type", &self.parcel_type);
        insert_property(&mut properties, "area_ha", self.area_ha);
        properties
    }
}

/// One "Parcels" group with an inline leaf per tenure class.
pub fn project_parcel_type_tree(parcels: &[parcels::Model], bounds: Option<BoundingBox>) -> Vec<LayerNode> {
    let serializer = FeatureSerializer::new().within(bounds);

    let leaves = TenureClass::ALL
        .into_iter()
        .map(|class| {
            let selected: Vec<parcels::Model> = parcels
                .iter()
                .filter(|p| TenureClass::classify(&p.tenure) == class)
                .cloned()
                .collect();

            LayerNode::inline(format!("parcels_{}", class.slug()), class.label(), serializer.serialize(&selected))
                .with_style(class.colour())
                .with_features("lot_plan", ["lot_plan", "tenure", "area_ha"])
        })
        .collect();

    vec![LayerNode::group("parcels", "Parcels", leaves)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(id: i32, tenure: &str) -> parcels::Model {
        parcels::Model {
            id,
            lot_plan: format!("{}SP{}", id, 100 + id),
            tenure: tenure.to_string(),
            parcel_type: None,
            area_ha: None,
            geometry: None,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(TenureClass::classify("FH"), TenureClass::Freehold);
        assert_eq!(TenureClass::classify("lands lease"), TenureClass::Leasehold);
        assert_eq!(TenureClass::classify("NP"), TenureClass::Reserve);
        assert_eq!(TenureClass::classify(" SL "), TenureClass::StateLand);
        assert_eq!(TenureClass::classify("Mining Homestead"), TenureClass::Other);
    }

    #[test]
    fn test_parcel_tree_groups_by_tenure() {
        let parcels = vec![parcel(1, "FH"), parcel(2, "LL"), parcel(3, "FH"), parcel(4, "XX")];
        let tree = project_parcel_type_tree(&parcels, None);

        let root = &tree[0];
        assert!(root.is_well_formed());
        assert_eq!(root.label(), "Parcels");
        assert_eq!(root.children().len(), TenureClass::ALL.len());

        let count = |id: &str| root.find(id).unwrap().data().unwrap().features.len();
        assert_eq!(count("parcels_freehold"), 2);
        assert_eq!(count("parcels_leasehold"), 1);
        assert_eq!(count("parcels_reserve"), 0);
        assert_eq!(count("parcels_other"), 1);
    }
}
