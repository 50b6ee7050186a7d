//! Tenement filters, serialization and layer trees.

use chrono::{Duration, NaiveDate};
use geojson::JsonObject;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};

use crate::database::entities::tenements;

use super::bbox::BoundingBox;
use super::colour::Colour;
use super::feature::{insert_property, FeatureSerializer, MapRecord, RecordKind};
use super::layer::LayerNode;

/// Forward-looking window for the "Approaching Expiry" layers.
pub const APPROACHING_EXPIRY_DAYS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitType {
    Epm,
    Mdl,
    Ml,
    Epc,
}

impl PermitType {
    /// Display order of the permit type groups.
    pub const ALL: [PermitType; 4] = [PermitType::Epm, PermitType::Mdl, PermitType::Ml, PermitType::Epc];

    pub fn code(&self) -> &'static str {
        match self {
            PermitType::Epm => "EPM",
            PermitType::Mdl => "MDL",
            PermitType::Ml => "ML",
            PermitType::Epc => "EPC",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PermitType::Epm => "epm",
            PermitType::Mdl => "mdl",
            PermitType::Ml => "ml",
            PermitType::Epc => "epc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PermitType::Epm => "Exploration Permit for Minerals",
            PermitType::Mdl => "Mining Development License",
            PermitType::Ml => "Mining Lease",
            PermitType::Epc => "Exploration Permit for Coal",
        }
    }

    /// Plural noun used in layer descriptions.
    fn noun(&self) -> &'static str {
        match self {
            PermitType::Epm => "exploration permits",
            PermitType::Mdl => "mining development licenses",
            PermitType::Ml => "mining leases",
            PermitType::Epc => "coal exploration permits",
        }
    }

    pub fn group_label(&self) -> String {
        format!("{} ({})", self.display_name(), self.code())
    }

    /// Accepts either the code (`EPM`) or the slug (`epm`).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitStatus {
    Application,
    Granted,
    Expired,
    Surrendered,
}

impl PermitStatus {
    pub fn code(&self) -> &'static str {
        match self {
            PermitStatus::Application => "A",
            PermitStatus::Granted => "G",
            PermitStatus::Expired => "E",
            PermitStatus::Surrendered => "S",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PermitStatus::Application => "Application",
            PermitStatus::Granted => "Granted",
            PermitStatus::Expired => "Expired",
            PermitStatus::Surrendered => "Surrendered",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(PermitStatus::Application),
            "G" => Some(PermitStatus::Granted),
            "E" => Some(PermitStatus::Expired),
            "S" => Some(PermitStatus::Surrendered),
            _ => None,
        }
    }
}

/// The per-type layers shown in the map tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenementLayer {
    Granted,
    Application,
    ApproachingExpiry,
}

impl TenementLayer {
    pub fn slug(&self) -> &'static str {
        match self {
            TenementLayer::Granted => "granted",
            TenementLayer::Application => "application",
            TenementLayer::ApproachingExpiry => "approaching-expiry",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            TenementLayer::Granted,
            TenementLayer::Application,
            TenementLayer::ApproachingExpiry,
        ]
        .into_iter()
        .find(|layer| layer.slug() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TenementLayer::Granted => "Granted Permits",
            TenementLayer::Application => "Application Permits",
            TenementLayer::ApproachingExpiry => "Approaching Expiry",
        }
    }

    /// Node id, e.g. `epm_granted`.
    pub fn node_id(&self, permit_type: PermitType) -> String {
        let suffix = match self {
            TenementLayer::Granted => "granted",
            TenementLayer::Application => "application",
            TenementLayer::ApproachingExpiry => "expiring",
        };
        format!("{}_{}", permit_type.slug(), suffix)
    }

    pub fn description(&self, permit_type: PermitType) -> String {
        match self {
            TenementLayer::Granted => format!(
                "All granted {} ({}) in Queensland",
                permit_type.noun(),
                permit_type.code()
            ),
            TenementLayer::Application => format!(
                "All application {} ({}) in Queensland",
                permit_type.noun(),
                permit_type.code()
            ),
            TenementLayer::ApproachingExpiry => format!(
                "All granted {} ({}) that are approaching expiry in Queensland",
                permit_type.noun(),
                permit_type.code()
            ),
        }
    }

    /// Date column shown next to the permit id in the popup table.
    pub fn date_column(&self) -> &'static str {
        match self {
            TenementLayer::Granted => "date_granted",
            TenementLayer::Application => "date_lodged",
            TenementLayer::ApproachingExpiry => "date_expiry",
        }
    }

    pub fn filter(&self, permit_type: PermitType, today: NaiveDate) -> TenementFilter {
        match self {
            TenementLayer::Granted => TenementFilter::new()
                .permit_type(permit_type)
                .status(PermitStatus::Granted),
            TenementLayer::Application => TenementFilter::new()
                .permit_type(permit_type)
                .status(PermitStatus::Application),
            TenementLayer::ApproachingExpiry => TenementFilter::approaching_expiry(permit_type, today),
        }
    }

    /// Layers listed under each permit type group. Only EPMs track expiry.
    pub fn for_type(permit_type: PermitType) -> &'static [TenementLayer] {
        match permit_type {
            PermitType::Epm => &[
                TenementLayer::Granted,
                TenementLayer::Application,
                TenementLayer::ApproachingExpiry,
            ],
            _ => &[TenementLayer::Granted, TenementLayer::Application],
        }
    }
}

pub fn layer_colour(permit_type: PermitType, layer: TenementLayer) -> Colour {
    match (permit_type, layer) {
        (PermitType::Epm, TenementLayer::Granted) => Colour::Pink,
        (PermitType::Epm, TenementLayer::Application) => Colour::Cyan,
        (_, TenementLayer::ApproachingExpiry) => Colour::Magenta,
        (PermitType::Mdl, TenementLayer::Granted) => Colour::Red,
        (PermitType::Mdl, TenementLayer::Application) => Colour::Peru,
        (PermitType::Ml, TenementLayer::Granted) => Colour::Blue,
        (PermitType::Ml, TenementLayer::Application) => Colour::Green,
        (PermitType::Epc, TenementLayer::Granted) => Colour::Teal,
        (PermitType::Epc, TenementLayer::Application) => Colour::Maroon,
    }
}

/// Categorical and date filters over tenements, usable both as a SQL
/// condition and as an in-memory predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenementFilter {
    permit_type: Option<PermitType>,
    status: Option<PermitStatus>,
    expiry_between: Option<(NaiveDate, NaiveDate)>,
}

impl TenementFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permit_type(mut self, permit_type: PermitType) -> Self {
        self.permit_type = Some(permit_type);
        self
    }

    pub fn status(mut self, status: PermitStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Inclusive on both ends.
    pub fn expiring_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.expiry_between = Some((from, to));
        self
    }

    /// Granted permits of `permit_type` expiring within the next
    /// [`APPROACHING_EXPIRY_DAYS`] days, today included.
    pub fn approaching_expiry(permit_type: PermitType, today: NaiveDate) -> Self {
        Self::new()
            .permit_type(permit_type)
            .status(PermitStatus::Granted)
            .expiring_between(today, today + Duration::days(APPROACHING_EXPIRY_DAYS))
    }

    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(permit_type) = self.permit_type {
            condition = condition.add(tenements::Column::PermitType.eq(permit_type.code()));
        }
        if let Some(status) = self.status {
            condition = condition.add(tenements::Column::PermitStatus.eq(status.code()));
        }
        if let Some((from, to)) = self.expiry_between {
            condition = condition
                .add(tenements::Column::DateExpiry.gte(from))
                .add(tenements::Column::DateExpiry.lte(to));
        }
        condition
    }

    /// Narrows `base` and orders the newest lodgements first.
    pub fn apply(&self, base: Select<tenements::Entity>) -> Select<tenements::Entity> {
        base.filter(self.condition())
            .order_by_desc(tenements::Column::DateLodged)
    }

    pub fn query(&self) -> Select<tenements::Entity> {
        self.apply(tenements::Entity::find())
    }

    pub fn matches(&self, tenement: &tenements::Model) -> bool {
        if let Some(permit_type) = self.permit_type {
            if tenement.permit_type != permit_type.code() {
                return false;
            }
        }
        if let Some(status) = self.status {
            if tenement.permit_status != status.code() {
                return false;
            }
        }
        if let Some((from, to)) = self.expiry_between {
            match tenement.date_expiry {
                Some(expiry) if expiry >= from && expiry <= to => {}
                _ => return false,
            }
        }
        true
    }
}

impl MapRecord for tenements::Model {
    const KIND: RecordKind = RecordKind::Tenement;

    fn record_id(&self) -> i32 {
        self.id
    }

    fn geometry_text(&self) -> Option<&str> {
        self.area_polygons.as_deref()
    }

    fn properties(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        insert_property(&mut properties, "permit_id", &self.permit_id);
        insert_property(&mut properties, "permit_state", &self.permit_state);
        insert_property(&mut properties, "permit_type", &self.permit_type);
        insert_property(&mut properties, "permit_number", self.permit_number);
        insert_property(&mut properties, "permit_status", &self.permit_status);
        insert_property(&mut properties, "date_lodged", self.date_lodged);
        insert_property(&mut properties, "date_granted", self.date_granted);
        insert_property(&mut properties, "date_commenced", self.date_commenced);
        insert_property(&mut properties, "date_expiry", self.date_expiry);
        insert_property(&mut properties, "date_renewed", self.date_renewed);
        insert_property(&mut properties, "ahr_name", &self.ahr_name);
        insert_property(
            &mut properties,
            "permit_status_display",
            PermitStatus::from_code(&self.permit_status)
                .map(|s| s.display_name())
                .unwrap_or(self.permit_status.as_str()),
        );
        insert_property(
            &mut properties,
            "permit_type_display",
            PermitType::parse(&self.permit_type)
                .map(|t| t.display_name())
                .unwrap_or(self.permit_type.as_str()),
        );
        properties
    }
}

/// Inline tree over an already-scoped tenement set: a fixed group per
/// permit type, each holding its status layers filtered from `tenements`.
pub fn map_box_tree(
    tenements: &[tenements::Model],
    today: NaiveDate,
    bounds: Option<BoundingBox>,
) -> Vec<LayerNode> {
    let serializer = FeatureSerializer::new().within(bounds);

    let groups = PermitType::ALL
        .into_iter()
        .map(|permit_type| {
            let leaves = TenementLayer::for_type(permit_type)
                .iter()
                .map(|layer| {
                    let filter = layer.filter(permit_type, today);
                    let selected: Vec<tenements::Model> = tenements
                        .iter()
                        .filter(|t| filter.matches(t))
                        .cloned()
                        .collect();

                    LayerNode::inline(layer.node_id(permit_type), layer.label(), serializer.serialize(&selected))
                        .with_description(layer.description(permit_type))
                        .with_style(layer_colour(permit_type, *layer))
                        .with_features("permit_id", ["permit_id", layer.date_column()])
                })
                .collect();

            LayerNode::group(permit_type.slug(), permit_type.group_label(), leaves)
        })
        .collect();

    vec![LayerNode::group("tenements", "Tenements", groups)]
}
