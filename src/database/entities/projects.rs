use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::project_tenements::Entity")]
    TenementLinks,
    #[sea_orm(has_many = "super::project_parcels::Entity")]
    ParcelLinks,
    #[sea_orm(has_many = "super::prospects::Entity")]
    Prospects,
}

impl Related<super::project_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::project_tenements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenementLinks.def()
    }
}

impl Related<super::project_parcels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParcelLinks.def()
    }
}

impl Related<super::prospects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prospects.def()
    }
}

/// Tenements linked to a project, via `project_tenements`.
impl Related<super::tenements::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_tenements::Relation::Tenements.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::project_tenements::Relation::Projects.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
