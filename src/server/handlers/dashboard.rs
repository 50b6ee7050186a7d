use axum::{extract::State, response::Html};

use crate::errors::AppResult;
use crate::server::app::AppState;
use crate::views::DashboardPage;

pub async fn render_page(State(state): State<AppState>, page: DashboardPage) -> AppResult<Html<String>> {
    Ok(Html(state.views.dashboard(page)?))
}
