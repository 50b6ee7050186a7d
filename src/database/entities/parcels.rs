use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parcels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub lot_plan: String,
    pub tenure: String,
    pub parcel_type: Option<String>,
    pub area_ha: Option<f64>,
    pub geometry: Option<String>, // GeoJSON geometry
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_parcels::Entity")]
    ProjectLinks,
}

impl Related<super::project_parcels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
