use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// The project's current timeline, as markdown-flavored plain text.
pub async fn timeline(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let output = load_output(&state, user.user_id, project_id)?;
    Ok(markdown_response(output.timeline_content))
}

/// The project's current narrative, as markdown-flavored plain text.
pub async fn narrative(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let output = load_output(&state, user.user_id, project_id)?;
    Ok(markdown_response(output.narrative_content))
}

fn load_output(
    state: &AppState,
    user_id: i64,
    project_id: i64,
) -> Result<caseline_storage::OutputRecord, ApiError> {
    let store = state.store.lock().unwrap();
    store
        .get_project(user_id, project_id)?
        .ok_or_else(|| ApiError::not_found("project not found"))?;
    store
        .get_output(project_id)?
        .ok_or_else(|| ApiError::not_found("project has not been processed yet"))
}

fn markdown_response(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], body)
}
