use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{CreateProjectRequest, DocumentJson, ProjectDetailJson, ProjectJson};
use crate::state::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectJson>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("project name is required"));
    }

    let store = state.store.lock().unwrap();
    let id = store.create_project(user.user_id, name)?;
    let project = store
        .get_project(user.user_id, id)?
        .ok_or_else(|| ApiError::not_found("project not found"))?;
    Ok((StatusCode::CREATED, Json(ProjectJson::from(&project))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<ProjectJson>>, ApiError> {
    let store = state.store.lock().unwrap();
    let projects = store.list_projects(user.user_id)?;
    Ok(Json(projects.iter().map(ProjectJson::from).collect()))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
) -> Result<Json<ProjectDetailJson>, ApiError> {
    let store = state.store.lock().unwrap();
    let project = store
        .get_project(user.user_id, project_id)?
        .ok_or_else(|| ApiError::not_found("project not found"))?;
    let documents = store.list_documents(project_id)?;
    let has_output = store.get_output(project_id)?.is_some();

    Ok(Json(ProjectDetailJson {
        project: ProjectJson::from(&project),
        documents: documents.iter().map(DocumentJson::from).collect(),
        has_output,
    }))
}

pub async fn archive(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().unwrap();
    if store.archive_project(user.user_id, project_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("project not found"))
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().unwrap();
    if store.delete_project(user.user_id, project_id)? {
        state.processing_locks.remove(&project_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("project not found"))
    }
}
