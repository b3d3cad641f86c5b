use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse};
use crate::state::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let store = state.store.lock().unwrap();
    store.create_user(req.username.trim(), req.email.trim(), &req.password)?;
    tracing::info!(username = %req.username.trim(), "user registered");
    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = {
        let store = state.store.lock().unwrap();
        store.verify_user(&req.username, &req.password)?
    };

    let user =
        user.ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "invalid credentials"))?;

    let token = state.create_session(user.id);
    Ok(Json(TokenResponse { token }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    headers: axum::http::HeaderMap,
) -> StatusCode {
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.sessions.remove(token);
    }
    StatusCode::NO_CONTENT
}
