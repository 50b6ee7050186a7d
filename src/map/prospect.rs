use geojson::JsonObject;

use crate::database::entities::prospects;

use super::bbox::BoundingBox;
use super::feature::{insert_property, FeatureSerializer, MapRecord, RecordKind};
use super::layer::LayerNode;

impl MapRecord for prospects::Model {
    const KIND: RecordKind = RecordKind::Prospect;

    fn record_id(&self) -> i32 {
        self.id
    }

    fn geometry_text(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn properties(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        insert_property(&mut properties, "name", &self.name);
        properties
    }
}

/// Single inline "Prospects" leaf, shown by default.
pub fn prospects_tree(prospects: &[prospects::Model], bounds: Option<BoundingBox>) -> Vec<LayerNode> {
    let data = FeatureSerializer::new().within(bounds).serialize(prospects);

    vec![LayerNode::inline("prospects", "Prospects", data)
        .enabled(true)
        .with_features("name", ["name"])]
}
