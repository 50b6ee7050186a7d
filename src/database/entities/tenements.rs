use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub permit_id: String,
    pub permit_state: String,
    pub permit_type: String,
    pub permit_number: i32,
    pub permit_status: String,
    pub date_lodged: Option<Date>,
    pub date_granted: Option<Date>,
    pub date_commenced: Option<Date>,
    pub date_expiry: Option<Date>,
    pub date_renewed: Option<Date>,
    pub ahr_name: Option<String>,
    pub area_polygons: Option<String>, // GeoJSON geometry
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_tenements::Entity")]
    ProjectLinks,
}

impl Related<super::project_tenements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
