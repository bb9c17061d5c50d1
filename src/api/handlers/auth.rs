use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::{AppError, AppResult};
use crate::api::extract::{bearer_token, JsonBody};
use crate::api::state::AppState;
use crate::auth;
use crate::db;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let pruned = db::delete_expired_sessions(&state.pool, state.config.http.session_ttl()).await?;
    if pruned > 0 {
        tracing::debug!(pruned, "expired sessions removed");
    }
    match auth::login(&state.pool, &input.username, &input.password).await? {
        Some(token) => {
            tracing::info!(username = %input.username.trim(), "login succeeded");
            Ok(Json(LoginResponse {
                token,
                token_type: "Bearer",
            }))
        }
        None => {
            tracing::warn!(username = %input.username.trim(), "login failed");
            Err(AppError::Unauthorized("invalid username or password".into()))
        }
    }
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<StatusCode> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("missing Authorization: Bearer <token> header".into()))?;
    if !auth::logout(&state.pool, token).await? {
        return Err(AppError::Unauthorized("invalid or expired session".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
