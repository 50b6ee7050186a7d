//! The layer catalog served to the map widget on load.

use super::layer::{LayerIcon, LayerNode};
use super::tenement::{layer_colour, PermitType, TenementLayer};

/// Fetch endpoint for one tenement layer.
pub fn layer_url(permit_type: PermitType, layer: TenementLayer) -> String {
    format!("/map/api/layers/{}/{}/", permit_type.slug(), layer.slug())
}

/// Permit types listed in the catalog. EPC layers are served but not listed yet.
const CATALOG_PERMIT_TYPES: [PermitType; 3] = [PermitType::Epm, PermitType::Mdl, PermitType::Ml];

const HAZARDS: [(&str, &str, &str); 3] = [
    ("hazard_fire", "Fire", "https://i.imgur.com/S0b6BcO.png"),
    ("hazard_flood", "Flood", "https://i.imgur.com/OC3GeFx.png"),
    ("hazard_other", "Other", "https://i.imgur.com/w12naKC.png"),
];

pub fn get_map_tree() -> Vec<LayerNode> {
    let tenement_groups = CATALOG_PERMIT_TYPES
        .into_iter()
        .map(|permit_type| {
            let leaves = TenementLayer::for_type(permit_type)
                .iter()
                .map(|layer| {
                    LayerNode::remote(layer.node_id(permit_type), layer.label(), layer_url(permit_type, *layer))
                        .with_description(layer.description(permit_type))
                        .with_style(layer_colour(permit_type, *layer))
                        .with_features("permit_id", ["permit_id", layer.date_column()])
                })
                .collect();
            LayerNode::group(permit_type.slug(), permit_type.group_label(), leaves)
        })
        .collect();

    let hazards = HAZARDS
        .into_iter()
        .map(|(id, label, icon_url)| LayerNode::marker(id, label, LayerIcon::marker(icon_url)))
        .collect();

    vec![
        LayerNode::group("tenements", "Tenements", tenement_groups),
        LayerNode::group("hazards", "Hazards", hazards),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::colour::Colour;

    fn root() -> LayerNode {
        LayerNode::group("root", "Root", get_map_tree())
    }

    #[test]
    fn test_catalog_shape() {
        let tree = get_map_tree();
        assert_eq!(tree.len(), 2);
        assert!(root().is_well_formed());

        let tenements = &tree[0];
        assert_eq!(
            tenements.children().iter().map(|c| c.label()).collect::<Vec<_>>(),
            vec![
                "Exploration Permit for Minerals (EPM)",
                "Mining Development License (MDL)",
                "Mining Lease (ML)",
            ]
        );
        assert_eq!(tenements.children()[0].children().len(), 3);
        assert_eq!(tenements.children()[1].children().len(), 2);
        assert_eq!(tenements.children()[2].children().len(), 2);
    }

    #[test]
    fn test_leaf_urls_and_colours() {
        let root = root();
        let expected = [
            ("epm_granted", "/map/api/layers/epm/granted/", Colour::Pink),
            ("epm_application", "/map/api/layers/epm/application/", Colour::Cyan),
            ("epm_expiring", "/map/api/layers/epm/approaching-expiry/", Colour::Magenta),
            ("mdl_granted", "/map/api/layers/mdl/granted/", Colour::Red),
            ("mdl_application", "/map/api/layers/mdl/application/", Colour::Peru),
            ("ml_granted", "/map/api/layers/ml/granted/", Colour::Blue),
            ("ml_application", "/map/api/layers/ml/application/", Colour::Green),
        ];

        for (id, url, colour) in expected {
            let leaf = root.find(id).unwrap_or_else(|| panic!("missing {}", id));
            assert_eq!(leaf.url(), Some(url));
            assert_eq!(leaf.style().unwrap().color, colour.hex());
            assert!(leaf.data().is_none());
        }
    }

    #[test]
    fn test_hazards_are_marker_leaves() {
        let tree = get_map_tree();
        let hazards = &tree[1];
        assert_eq!(hazards.children().len(), 3);
        for hazard in hazards.children() {
            assert!(!hazard.is_group());
            assert!(hazard.url().is_none());
            assert_eq!(hazard.icon().unwrap().icon_size, [32, 32]);
        }
    }
}
