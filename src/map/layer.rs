//! Layer tree nodes consumed by the front-end tree control.
//!
//! A [`LayerNode`] is either a *group* holding children, or a *leaf* that
//! carries a fetch url, an inline feature collection, or only a marker icon.
//! The constructors are the only way to build a node, so a group can never
//! carry data and a leaf can never carry children.

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use super::colour::Colour;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub color: String,
}

impl From<Colour> for LayerStyle {
    fn from(colour: Colour) -> Self {
        Self {
            color: colour.hex().to_string(),
        }
    }
}

/// Leaflet `L.icon` options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerIcon {
    pub icon_url: String,
    pub icon_size: [i32; 2],
    pub icon_anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

impl LayerIcon {
    /// A 32px marker anchored at its bottom centre.
    pub fn marker(icon_url: impl Into<String>) -> Self {
        Self {
            icon_url: icon_url.into(),
            icon_size: [32, 32],
            icon_anchor: [16, 32],
            popup_anchor: [0, -32],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerNode {
    id: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<LayerStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_table: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<LayerIcon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<FeatureCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<LayerNode>>,
}

impl LayerNode {
    fn bare(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            style: None,
            url: None,
            feature_name: None,
            feature_table: None,
            icon: None,
            enabled: None,
            data: None,
            children: None,
        }
    }

    pub fn group(id: impl Into<String>, label: impl Into<String>, children: Vec<LayerNode>) -> Self {
        Self {
            children: Some(children),
            ..Self::bare(id, label)
        }
    }

    /// Leaf whose features are fetched from `url` when the layer is shown.
    pub fn remote(id: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(id, label)
        }
    }

    /// Leaf carrying its features inline.
    pub fn inline(id: impl Into<String>, label: impl Into<String>, data: FeatureCollection) -> Self {
        Self {
            data: Some(data),
            ..Self::bare(id, label)
        }
    }

    /// Leaf that only places a marker icon.
    pub fn marker(id: impl Into<String>, label: impl Into<String>, icon: LayerIcon) -> Self {
        Self {
            icon: Some(icon),
            ..Self::bare(id, label)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<LayerStyle>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Attribute shown as a feature's name and the attributes listed in its popup table.
    pub fn with_features<S: Into<String>>(
        mut self,
        feature_name: impl Into<String>,
        feature_table: impl IntoIterator<Item = S>,
    ) -> Self {
        self.feature_name = Some(feature_name.into());
        self.feature_table = Some(feature_table.into_iter().map(Into::into).collect());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn style(&self) -> Option<&LayerStyle> {
        self.style.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn feature_name(&self) -> Option<&str> {
        self.feature_name.as_deref()
    }

    pub fn feature_table(&self) -> Option<&[String]> {
        self.feature_table.as_deref()
    }

    pub fn icon(&self) -> Option<&LayerIcon> {
        self.icon.as_ref()
    }

    pub fn is_enabled(&self) -> Option<bool> {
        self.enabled
    }

    pub fn data(&self) -> Option<&FeatureCollection> {
        self.data.as_ref()
    }

    pub fn children(&self) -> &[LayerNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// Checks the group/leaf shape of this node and all of its descendants,
    /// and that sibling ids are unique. Trees built here always pass;
    /// this is for trees that arrive deserialized.
    pub fn is_well_formed(&self) -> bool {
        match &self.children {
            Some(children) => {
                if self.url.is_some() || self.data.is_some() {
                    return false;
                }
                let mut ids = std::collections::HashSet::new();
                children
                    .iter()
                    .all(|child| ids.insert(child.id.as_str()) && child.is_well_formed())
            }
            None => !(self.url.is_some() && self.data.is_some()),
        }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&LayerNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_collection() -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        }
    }

    #[test]
    fn test_remote_leaf_serialization() {
        let node = LayerNode::remote("epm_granted", "Granted Permits", "/map/api/layers/epm/granted/")
            .with_description("All granted exploration permits (EPM) in Queensland")
            .with_style(Colour::Pink)
            .with_features("permit_id", ["permit_id", "date_granted"]);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "epm_granted",
                "label": "Granted Permits",
                "description": "All granted exploration permits (EPM) in Queensland",
                "url": "/map/api/layers/epm/granted/",
                "style": { "color": "#FFC0CB" },
                "feature_name": "permit_id",
                "feature_table": ["permit_id", "date_granted"],
            })
        );
    }

    #[test]
    fn test_marker_icon_uses_leaflet_keys() {
        let node = LayerNode::marker("hazard_fire", "Fire", LayerIcon::marker("https://example.com/fire.png"));
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["icon"]["iconUrl"], "https://example.com/fire.png");
        assert_eq!(value["icon"]["iconSize"], json!([32, 32]));
        assert_eq!(value["icon"]["iconAnchor"], json!([16, 32]));
        assert_eq!(value["icon"]["popupAnchor"], json!([0, -32]));
        assert!(value.get("children").is_none());
    }

    #[test]
    fn test_inline_leaf_serializes_empty_collection() {
        let node = LayerNode::inline("prospects", "Prospects", empty_collection()).enabled(true);
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["data"]["type"], "FeatureCollection");
        assert_eq!(value["data"]["features"], json!([]));
        assert_eq!(value["enabled"], true);
    }

    #[test]
    fn test_group_shape_and_find() {
        let tree = LayerNode::group(
            "tenements",
            "Tenements",
            vec![LayerNode::group(
                "epm",
                "Exploration Permit for Minerals (EPM)",
                vec![LayerNode::inline("epm_granted", "Granted Permits", empty_collection())],
            )],
        );

        assert!(tree.is_group());
        assert!(tree.is_well_formed());
        assert_eq!(tree.find("epm_granted").map(|n| n.label()), Some("Granted Permits"));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_deserialized_group_with_url_is_rejected() {
        let node: LayerNode = serde_json::from_value(json!({
            "id": "0",
            "label": "Broken",
            "url": "/somewhere/",
            "children": []
        }))
        .unwrap();
        assert!(!node.is_well_formed());
    }

    #[test]
    fn test_duplicate_sibling_ids_are_rejected() {
        let tree = LayerNode::group(
            "root",
            "Root",
            vec![
                LayerNode::remote("a", "A", "/a/"),
                LayerNode::remote("a", "A again", "/a2/"),
            ],
        );
        assert!(!tree.is_well_formed());
    }
}
