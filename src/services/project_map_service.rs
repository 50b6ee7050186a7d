use std::collections::BTreeSet;

use chrono::Utc;
use geo::Intersects;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::database::entities::{parcels, project_parcels, project_tenements, projects, prospects, tenements};
use crate::errors::{AppError, AppResult};
use crate::map::feature::{parse_geometry, to_geo};
use crate::map::tenement::TenementFilter;

/// Result of replacing a project's parcel associations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub removed: usize,
    pub retained: usize,
}

pub struct ProjectMapService {
    db: DatabaseConnection,
}

impl ProjectMapService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_project(&self, slug: &str) -> AppResult<projects::Model> {
        projects::Entity::find()
            .filter(projects::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project '{}'", slug)))
    }

    /// Tenements linked to the project, newest lodgement first.
    pub async fn project_tenements(&self, project_id: i32) -> AppResult<Vec<tenements::Model>> {
        let base = tenements::Entity::find()
            .inner_join(project_tenements::Entity)
            .filter(project_tenements::Column::ProjectId.eq(project_id));

        Ok(TenementFilter::new().apply(base).all(&self.db).await?)
    }

    pub async fn project_prospects(&self, project_id: i32) -> AppResult<Vec<prospects::Model>> {
        Ok(prospects::Entity::find()
            .filter(prospects::Column::ProjectId.eq(project_id))
            .order_by_asc(prospects::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Parcels whose geometry intersects any of the project's tenement areas.
    pub async fn parcels_within_project(&self, project_id: i32) -> AppResult<Vec<parcels::Model>> {
        let footprints: Vec<geo::Geometry<f64>> = self
            .project_tenements(project_id)
            .await?
            .iter()
            .filter_map(|t| t.area_polygons.as_deref())
            .filter_map(read_geometry)
            .collect();

        if footprints.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = parcels::Entity::find()
            .filter(parcels::Column::Geometry.is_not_null())
            .order_by_asc(parcels::Column::Id)
            .all(&self.db)
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|parcel| {
                parcel
                    .geometry
                    .as_deref()
                    .and_then(read_geometry)
                    .map(|shape| footprints.iter().any(|f| f.intersects(&shape)))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Makes the project's stored parcel associations equal `parcel_ids`.
    ///
    /// Only the difference is written, inside one transaction, and inserts
    /// skip pairs that already exist, so concurrent calls converge on the
    /// same set without ever leaving it empty. Other projects are untouched.
    pub async fn reconcile_project_parcels(
        &self,
        project_id: i32,
        parcel_ids: &[i32],
    ) -> AppResult<ReconcileSummary> {
        let desired: BTreeSet<i32> = parcel_ids.iter().copied().collect();

        let txn = self.db.begin().await?;

        let existing: BTreeSet<i32> = project_parcels::Entity::find()
            .select_only()
            .column(project_parcels::Column::ParcelId)
            .filter(project_parcels::Column::ProjectId.eq(project_id))
            .into_tuple::<i32>()
            .all(&txn)
            .await?
            .into_iter()
            .collect();

        let stale: Vec<i32> = existing.difference(&desired).copied().collect();
        let missing: Vec<i32> = desired.difference(&existing).copied().collect();

        if !stale.is_empty() {
            project_parcels::Entity::delete_many()
                .filter(project_parcels::Column::ProjectId.eq(project_id))
                .filter(project_parcels::Column::ParcelId.is_in(stale.clone()))
                .exec(&txn)
                .await?;
        }

        if !missing.is_empty() {
            let now = Utc::now();
            let rows = missing.iter().map(|&parcel_id| project_parcels::ActiveModel {
                project_id: Set(project_id),
                parcel_id: Set(parcel_id),
                created_at: Set(now),
                ..Default::default()
            });

            project_parcels::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([
                        project_parcels::Column::ProjectId,
                        project_parcels::Column::ParcelId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        let summary = ReconcileSummary {
            added: missing.len(),
            removed: stale.len(),
            retained: existing.len() - stale.len(),
        };
        debug!(
            "Reconciled parcels for project {}: {} added, {} removed, {} retained",
            project_id, summary.added, summary.removed, summary.retained
        );

        Ok(summary)
    }

    pub async fn project_parcel_ids(&self, project_id: i32) -> AppResult<Vec<i32>> {
        Ok(project_parcels::Entity::find()
            .select_only()
            .column(project_parcels::Column::ParcelId)
            .filter(project_parcels::Column::ProjectId.eq(project_id))
            .order_by_asc(project_parcels::Column::ParcelId)
            .into_tuple::<i32>()
            .all(&self.db)
            .await?)
    }
}

fn read_geometry(text: &str) -> Option<geo::Geometry<f64>> {
    parse_geometry(text)
        .ok()
        .and_then(|geometry| to_geo(&geometry).ok())
}
