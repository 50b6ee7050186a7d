use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::ApiToken).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Projects::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectMembers::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ProjectMembers::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectMembers::UserId).integer().not_null())
                    .col(ColumnDef::new(ProjectMembers::CanRead).boolean().not_null().default(true))
                    .col(ColumnDef::new(ProjectMembers::CanWrite).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_members_project_id")
                            .from(ProjectMembers::Table, ProjectMembers::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_members_user_id")
                            .from(ProjectMembers::Table, ProjectMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_members_project_user")
                    .table(ProjectMembers::Table)
                    .col(ProjectMembers::ProjectId)
                    .col(ProjectMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenements::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Tenements::PermitId).string().not_null())
                    .col(ColumnDef::new(Tenements::PermitState).string().not_null())
                    .col(ColumnDef::new(Tenements::PermitType).string().not_null())
                    .col(ColumnDef::new(Tenements::PermitNumber).integer().not_null())
                    .col(ColumnDef::new(Tenements::PermitStatus).string().not_null())
                    .col(ColumnDef::new(Tenements::DateLodged).date())
                    .col(ColumnDef::new(Tenements::DateGranted).date())
                    .col(ColumnDef::new(Tenements::DateCommenced).date())
                    .col(ColumnDef::new(Tenements::DateExpiry).date())
                    .col(ColumnDef::new(Tenements::DateRenewed).date())
                    .col(ColumnDef::new(Tenements::AhrName).string())
                    .col(ColumnDef::new(Tenements::AreaPolygons).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenements_type_status")
                    .table(Tenements::Table)
                    .col(Tenements::PermitType)
                    .col(Tenements::PermitStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenements_permit")
                    .table(Tenements::Table)
                    .col(Tenements::PermitState)
                    .col(Tenements::PermitType)
                    .col(Tenements::PermitNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Parcels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parcels::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Parcels::LotPlan).string().not_null())
                    .col(ColumnDef::new(Parcels::Tenure).string().not_null())
                    .col(ColumnDef::new(Parcels::ParcelType).string())
                    .col(ColumnDef::new(Parcels::AreaHa).double())
                    .col(ColumnDef::new(Parcels::Geometry).text())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Parcels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    ApiToken,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Slug,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectMembers {
    Table,
    Id,
    ProjectId,
    UserId,
    CanRead,
    CanWrite,
}

#[derive(DeriveIden)]
enum Tenements {
    Table,
    Id,
    PermitId,
    PermitState,
    PermitType,
    PermitNumber,
    PermitStatus,
    DateLodged,
    DateGranted,
    DateCommenced,
    DateExpiry,
    DateRenewed,
    AhrName,
    AreaPolygons,
}

#[derive(DeriveIden)]
enum Parcels {
    Table,
    Id,
    LotPlan,
    Tenure,
    ParcelType,
    AreaHa,
    Geometry,
}
