use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::require_name;
use crate::api::error::{AppError, AppResult};
use crate::api::extract::{JsonBody, RequireSession};
use crate::api::state::AppState;
use crate::db::{self, Tip};

#[derive(Debug, Default, Deserialize)]
pub struct TipFilter {
    pub category: Option<String>,
}

impl TipFilter {
    fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// GET /api/tips?category=
pub async fn list_tips(
    State(state): State<AppState>,
    Query(filter): Query<TipFilter>,
) -> AppResult<Json<Vec<Tip>>> {
    Ok(Json(db::list_tips(&state.pool, filter.category()).await?))
}

/// GET /api/tips/random?category=
pub async fn random_tip(
    State(state): State<AppState>,
    Query(filter): Query<TipFilter>,
) -> AppResult<Json<Tip>> {
    db::random_tip(&state.pool, filter.category())
        .await?
        .map(Json)
        .ok_or_else(|| match filter.category() {
            Some(c) => AppError::NotFound(format!("no tips in category '{c}'")),
            None => AppError::NotFound("no tips available".into()),
        })
}

#[derive(Debug, Deserialize)]
pub struct NewTip {
    pub category: String,
    pub tip: String,
}

/// POST /api/tips
pub async fn create_tip(
    _session: RequireSession,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewTip>,
) -> AppResult<(StatusCode, Json<Tip>)> {
    let category = require_name("category", &input.category)?;
    let text = require_name("tip", &input.tip)?;
    let tip = db::insert_tip(&state.pool, &category, &text).await?;
    Ok((StatusCode::CREATED, Json(tip)))
}
