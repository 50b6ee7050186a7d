use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProjectTenements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectTenements::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ProjectTenements::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectTenements::TenementId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_tenements_project_id")
                            .from(ProjectTenements::Table, ProjectTenements::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_tenements_tenement_id")
                            .from(ProjectTenements::Table, ProjectTenements::TenementId)
                            .to(Tenements::Table, Tenements::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_tenements_pair")
                    .table(ProjectTenements::Table)
                    .col(ProjectTenements::ProjectId)
                    .col(ProjectTenements::TenementId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One row per (project, parcel); reconciliation relies on this.
        manager
            .create_table(
                Table::create()
                    .table(ProjectParcels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectParcels::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ProjectParcels::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectParcels::ParcelId).integer().not_null())
                    .col(ColumnDef::new(ProjectParcels::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_parcels_project_id")
                            .from(ProjectParcels::Table, ProjectParcels::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_parcels_parcel_id")
                            .from(ProjectParcels::Table, ProjectParcels::ParcelId)
                            .to(Parcels::Table, Parcels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_parcels_pair")
                    .table(ProjectParcels::Table)
                    .col(ProjectParcels::ProjectId)
                    .col(ProjectParcels::ParcelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Prospects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Prospects::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Prospects::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Prospects::Name).string().not_null())
                    .col(ColumnDef::new(Prospects::Location).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prospects_project_id")
                            .from(Prospects::Table, Prospects::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prospects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectParcels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectTenements::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProjectTenements {
    Table,
    Id,
    ProjectId,
    TenementId,
}

#[derive(DeriveIden)]
enum ProjectParcels {
    Table,
    Id,
    ProjectId,
    ParcelId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Prospects {
    Table,
    Id,
    ProjectId,
    Name,
    Location,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Tenements {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Parcels {
    Table,
    Id,
}
