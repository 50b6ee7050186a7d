use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::Deserialize;

use crate::database::entities::{project_members, projects, users};
use crate::errors::AppError;
use crate::server::app::AppState;
use crate::services::AuthService;

/// The project named in the route, resolved for a user holding `can_read`.
///
/// Missing or unknown tokens reject with 401, an unknown project with 404 and
/// a user without read access with 403.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub user: users::Model,
    pub project: projects::Model,
    pub membership: project_members::Model,
}

#[derive(Deserialize)]
struct ProjectPath {
    slug: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for ProjectContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        let auth = AuthService::new(state.db.clone());
        let user = auth.authenticate(token).await?;

        let Path(ProjectPath { slug }) = Path::<ProjectPath>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Project".to_string()))?;

        let access = auth.authorize(user, &slug, "can_read").await?;

        Ok(ProjectContext {
            user: access.user,
            project: access.project,
            membership: access.membership,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
