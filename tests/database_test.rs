//! Database integration tests
//!
//! Migrations, schema constraints, reconciliation and the import and admin
//! services against a real SQLite file.

mod common;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use tempfile::NamedTempFile;

use common::*;
use treeminder::database::entities::{parcels, project_parcels, projects, prospects, tenements};
use treeminder::errors::{AppError, ImportError};
use treeminder::services::{AdminService, ImportService, ProjectMapService, ReconcileSummary};

#[tokio::test]
async fn test_migrations_create_tables() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;

    assert_eq!(projects::Entity::find().count(&db).await?, 0);
    assert_eq!(tenements::Entity::find().count(&db).await?, 0);
    assert_eq!(parcels::Entity::find().count(&db).await?, 0);
    assert_eq!(project_parcels::Entity::find().count(&db).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_project_parcel_pair_is_unique() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project = AdminService::new(db.clone()).create_project("alpha", "Alpha", None).await?;
    let parcel = insert_parcel(&db, "1RP1000", "FH", None).await?;

    let link = || project_parcels::ActiveModel {
        project_id: Set(project.id),
        parcel_id: Set(parcel.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    link().insert(&db).await?;
    assert!(link().insert(&db).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_reconcile_only_touches_target_project() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let admin = AdminService::new(db.clone());
    let alpha = admin.create_project("alpha", "Alpha", None).await?;
    let beta = admin.create_project("beta", "Beta", None).await?;

    let mut ids = Vec::new();
    for n in 0..4 {
        ids.push(insert_parcel(&db, &format!("{}RP100", n), "FH", None).await?.id);
    }

    let service = ProjectMapService::new(db.clone());
    service.reconcile_project_parcels(beta.id, &ids[..2]).await?;

    let first = service.reconcile_project_parcels(alpha.id, &ids[..3]).await?;
    assert_eq!(
        first,
        ReconcileSummary {
            added: 3,
            removed: 0,
            retained: 0
        }
    );

    let second = service.reconcile_project_parcels(alpha.id, &[ids[1], ids[3], ids[3]]).await?;
    assert_eq!(
        second,
        ReconcileSummary {
            added: 1,
            removed: 2,
            retained: 1
        }
    );
    assert_eq!(service.project_parcel_ids(alpha.id).await?, vec![ids[1], ids[3]]);

    let repeat = service.reconcile_project_parcels(alpha.id, &[ids[3], ids[1]]).await?;
    assert_eq!(
        repeat,
        ReconcileSummary {
            added: 0,
            removed: 0,
            retained: 2
        }
    );

    assert_eq!(service.project_parcel_ids(beta.id).await?, vec![ids[0], ids[1]]);

    service.reconcile_project_parcels(alpha.id, &[]).await?;
    assert!(service.project_parcel_ids(alpha.id).await?.is_empty());
    assert_eq!(service.project_parcel_ids(beta.id).await?.len(), 2);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reconciles_converge() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let project = AdminService::new(db.clone()).create_project("alpha", "Alpha", None).await?;

    let mut all = Vec::new();
    for n in 0..20 {
        all.push(insert_parcel(&db, &format!("{}RP200", n), "FH", None).await?.id);
    }
    let half: Vec<i32> = all[..10].to_vec();

    let project_id = project.id;
    ProjectMapService::new(db.clone())
        .reconcile_project_parcels(project_id, &half)
        .await?;

    // Readers must never observe the association set emptied mid-reconcile.
    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let service = ProjectMapService::new(db.clone());
        let done = done.clone();
        tokio::spawn(async move {
            let mut reads = 0usize;
            while !done.load(Ordering::Relaxed) {
                let stored = service.project_parcel_ids(project_id).await?;
                assert!(!stored.is_empty(), "associations were empty after read {}", reads);
                reads += 1;
                tokio::task::yield_now().await;
            }
            Ok::<_, AppError>(reads)
        })
    };

    for round in 0..10 {
        let tasks: Vec<_> = (0..8)
            .map(|n| {
                let service = ProjectMapService::new(db.clone());
                let desired = if (round + n) % 2 == 0 { all.clone() } else { half.clone() };
                tokio::spawn(async move { service.reconcile_project_parcels(project_id, &desired).await })
            })
            .collect();

        for task in tasks {
            let result = task.await?;
            assert!(result.is_ok(), "round {} reconcile failed: {:?}", round, result.err());
        }

        let stored = ProjectMapService::new(db.clone()).project_parcel_ids(project_id).await?;
        assert!(stored == all || stored == half, "round {} left {:?}", round, stored);
    }

    done.store(true, Ordering::Relaxed);
    let reads = reader.await??;
    assert!(reads > 0);

    let summary = ProjectMapService::new(db.clone())
        .reconcile_project_parcels(project_id, &all)
        .await?;
    assert_eq!(summary.added + summary.retained, all.len());
    assert_eq!(
        ProjectMapService::new(db.clone()).project_parcel_ids(project_id).await?,
        all
    );

    Ok(())
}

#[tokio::test]
async fn test_parcels_within_project_uses_linked_tenements() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let admin = AdminService::new(db.clone());
    let project = admin.create_project("alpha", "Alpha", None).await?;

    let service = ProjectMapService::new(db.clone());
    insert_parcel(&db, "1RP1000", "FH", Some(square(146.1, -20.9, 0.1))).await?;
    assert!(service.parcels_within_project(project.id).await?.is_empty());

    insert_tenement(&db, "ML", 42, "G", None, Some(square(146.0, -21.0, 1.0))).await?;
    admin.link_tenement("alpha", "ML 42").await?;
    // Linking twice keeps a single association
    admin.link_tenement("alpha", "ML 42").await?;
    assert_eq!(service.project_tenements(project.id).await?.len(), 1);

    let parcels = service.parcels_within_project(project.id).await?;
    assert_eq!(parcels.len(), 1);
    assert_eq!(parcels[0].lot_plan, "1RP1000");

    Ok(())
}

#[tokio::test]
async fn test_grant_updates_existing_membership() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let admin = AdminService::new(db.clone());
    admin.create_project("alpha", "Alpha", None).await?;
    let user = admin.create_user("surveyor").await?;
    assert_eq!(user.api_token.len(), 32);

    let member = admin.grant("surveyor", "alpha", false).await?;
    assert!(member.can_read && !member.can_write);

    let member = admin.grant("surveyor", "alpha", true).await?;
    assert!(member.can_write);
    assert!(member.has_permission("can_read"));

    assert!(matches!(
        admin.grant("nobody", "alpha", false).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}

fn geojson_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

#[tokio::test]
async fn test_import_tenements_and_parcels() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let importer = ImportService::new(db.clone());

    let tenements_file = geojson_file(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[146,-21],[147,-21],[147,-20],[146,-20],[146,-21]]]},
             "properties":{"permit_type":"EPM","permit_number":27001,"permit_status":"G","date_expiry":"2030-01-31"}},
            {"type":"Feature","geometry":null,
             "properties":{"permit_type":"MDL","permit_number":"3001","permit_status":"A"}}
        ]}"#,
    )?;
    assert_eq!(importer.import_tenements(tenements_file.path()).await?, 2);

    let stored = tenements::Entity::find().all(&db).await?;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].permit_id, "EPM 27001");
    assert!(stored[0].area_polygons.as_deref().unwrap_or_default().contains("Polygon"));
    assert_eq!(stored[1].permit_number, 3001);

    let parcels_file = geojson_file(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"lot_plan":"1RP1000","tenure":"FH","area_ha":"4.2"}}
        ]}"#,
    )?;
    assert_eq!(importer.import_parcels(parcels_file.path()).await?, 1);
    let parcel = parcels::Entity::find().one(&db).await?.unwrap();
    assert_eq!(parcel.area_ha, Some(4.2));

    Ok(())
}

#[tokio::test]
async fn test_failed_import_writes_nothing() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let importer = ImportService::new(db.clone());

    let file = geojson_file(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"permit_type":"EPM","permit_number":1,"permit_status":"G"}},
            {"type":"Feature","geometry":null,"properties":{"permit_type":"EPM","permit_number":"two","permit_status":"G"}}
        ]}"#,
    )?;

    let err = importer.import_tenements(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::InvalidField {
            index: 1,
            field: "permit_number",
            ..
        }
    ));
    assert_eq!(tenements::Entity::find().count(&db).await?, 0);

    let missing = importer
        .import_tenements(std::path::Path::new("/nonexistent/tenements.geojson"))
        .await;
    assert!(matches!(missing, Err(ImportError::Io { .. })));

    Ok(())
}

#[tokio::test]
async fn test_import_prospects_requires_project() -> Result<()> {
    let (db, _dir) = setup_test_db().await?;
    let importer = ImportService::new(db.clone());
    let file = geojson_file(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[146.5,-20.5]},"properties":{"name":"Copper Knoll"}}
        ]}"#,
    )?;

    assert!(matches!(
        importer.import_prospects(file.path(), "alpha").await,
        Err(ImportError::App(AppError::NotFound(_)))
    ));

    let project = AdminService::new(db.clone()).create_project("alpha", "Alpha", None).await?;
    assert_eq!(importer.import_prospects(file.path(), "alpha").await?, 1);

    let prospect = prospects::Entity::find().one(&db).await?.unwrap();
    assert_eq!(prospect.project_id, project.id);
    assert_eq!(prospect.name, "Copper Knoll");

    Ok(())
}
