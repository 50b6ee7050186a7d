use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use crate::database::entities::{project_members, project_tenements, projects, tenements, users};
use crate::errors::{AppError, AppResult};

/// Project, user and permission management used by the CLI.
pub struct AdminService {
    db: DatabaseConnection,
}

impl AdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_project(
        &self,
        slug: &str,
        name: &str,
        description: Option<String>,
    ) -> AppResult<projects::Model> {
        let now = Utc::now();
        let project = projects::ActiveModel {
            slug: Set(slug.to_string()),
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created project '{}' ({})", project.slug, project.id);
        Ok(project)
    }

    /// Creates a user with a fresh API token.
    pub async fn create_user(&self, username: &str) -> AppResult<users::Model> {
        let user = users::ActiveModel {
            username: Set(username.to_string()),
            api_token: Set(Uuid::new_v4().simple().to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created user '{}'", user.username);
        Ok(user)
    }

    /// Grants read access, plus write access when `can_write` is set.
    /// Re-granting updates the existing membership.
    pub async fn grant(&self, username: &str, slug: &str, can_write: bool) -> AppResult<project_members::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}'", username)))?;
        let project = self.project(slug).await?;

        let existing = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project.id))
            .filter(project_members::Column::UserId.eq(user.id))
            .one(&self.db)
            .await?;

        let member = match existing {
            Some(member) => {
                let mut member: project_members::ActiveModel = member.into();
                member.can_read = Set(true);
                member.can_write = Set(can_write);
                member.update(&self.db).await?
            }
            None => {
                project_members::ActiveModel {
                    project_id: Set(project.id),
                    user_id: Set(user.id),
                    can_read: Set(true),
                    can_write: Set(can_write),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };

        info!("Granted '{}' access to project '{}' (write: {})", username, slug, can_write);
        Ok(member)
    }

    pub async fn link_tenement(&self, slug: &str, permit_id: &str) -> AppResult<project_tenements::Model> {
        let project = self.project(slug).await?;
        let tenement = tenements::Entity::find()
            .filter(tenements::Column::PermitId.eq(permit_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenement '{}'", permit_id)))?;

        let existing = project_tenements::Entity::find()
            .filter(project_tenements::Column::ProjectId.eq(project.id))
            .filter(project_tenements::Column::TenementId.eq(tenement.id))
            .one(&self.db)
            .await?;
        if let Some(link) = existing {
            return Ok(link);
        }

        let link = project_tenements::ActiveModel {
            project_id: Set(project.id),
            tenement_id: Set(tenement.id),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Linked tenement '{}' to project '{}'", permit_id, slug);
        Ok(link)
    }

    async fn project(&self, slug: &str) -> AppResult<projects::Model> {
        projects::Entity::find()
            .filter(projects::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project '{}'", slug)))
    }
}
