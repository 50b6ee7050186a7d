use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

use crate::database::entities::{project_members, projects, users};
use crate::errors::{AppError, AppResult};

/// A user allowed to act on a project, with the membership that allowed it.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    pub user: users::Model,
    pub project: projects::Model,
    pub membership: project_members::Model,
}

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves an API token to an active user.
    pub async fn authenticate(&self, token: &str) -> AppResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::ApiToken.eq(token))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Checks `permission` ("can_read" or "can_write") on the project named by `slug`.
    pub async fn authorize(
        &self,
        user: users::Model,
        slug: &str,
        permission: &str,
    ) -> AppResult<ProjectAccess> {
        let project = projects::Entity::find()
            .filter(projects::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project '{}'", slug)))?;

        let membership = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project.id))
            .filter(project_members::Column::UserId.eq(user.id))
            .one(&self.db)
            .await?
            .filter(|m| m.has_permission(permission))
            .ok_or_else(|| {
                debug!("User '{}' lacks {} on project '{}'", user.username, permission, slug);
                AppError::Forbidden(permission.to_string())
            })?;

        Ok(ProjectAccess {
            user,
            project,
            membership,
        })
    }
}
