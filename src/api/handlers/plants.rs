//! Plants, their watering status and the per-type watering rules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{require_interval, require_name, require_past_date, MAX_INTERVAL_WEEKS};
use crate::api::error::{AppError, AppResult};
use crate::api::extract::{JsonBody, RequireSession};
use crate::api::state::AppState;
use crate::db::{self, PlantRow, PlantType, PlantUpdate};
use crate::watering::{self, season_for, watering_status, DueStatus, Season};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Trimmed, lower-cased, inner whitespace runs replaced by `_`.
pub fn normalize_type_name(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), "_").to_lowercase()
}

/// A plant as served to clients, with its status for `today`.
#[derive(Debug, Clone, Serialize)]
pub struct PlantView {
    #[serde(flatten)]
    pub plant: PlantRow,
    pub season: Season,
    #[serde(flatten)]
    pub status: DueStatus,
    pub status_label: String,
}

impl PlantView {
    pub fn new(plant: PlantRow, today: NaiveDate) -> Self {
        let status = watering_status(plant.last_watered, plant.rule(), today);
        Self {
            season: season_for(today),
            status_label: status.label(),
            status,
            plant,
        }
    }
}

async fn load_view(state: &AppState, id: i64) -> AppResult<PlantView> {
    let plant = db::get_plant(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("plant", id))?;
    Ok(PlantView::new(plant, watering::today()))
}

async fn ensure_type_exists(state: &AppState, type_id: i64) -> AppResult<()> {
    match db::get_plant_type(&state.pool, type_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("unknown plant type {type_id}"))),
    }
}

/// GET /api/plants
pub async fn list_plants(State(state): State<AppState>) -> AppResult<Json<Vec<PlantView>>> {
    let today = watering::today();
    let plants = db::list_plants(&state.pool).await?;
    Ok(Json(plants.into_iter().map(|p| PlantView::new(p, today)).collect()))
}

/// GET /api/plants/{id}
pub async fn get_plant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PlantView>> {
    load_view(&state, id).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct CreatePlant {
    pub name: String,
    pub type_id: i64,
    /// Defaults to today.
    pub last_watered: Option<NaiveDate>,
}

/// POST /api/plants
pub async fn create_plant(
    _session: RequireSession,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreatePlant>,
) -> AppResult<(StatusCode, Json<PlantView>)> {
    let name = require_name("name", &input.name)?;
    ensure_type_exists(&state, input.type_id).await?;
    let last_watered = match input.last_watered {
        Some(date) => require_past_date("last_watered", date)?,
        None => watering::today(),
    };
    let id = db::insert_plant(&state.pool, &name, input.type_id, last_watered).await?;
    tracing::info!(plant_id = id, name = %name, "plant added");
    Ok((StatusCode::CREATED, Json(load_view(&state, id).await?)))
}

/// PUT /api/plants/{id}
///
/// Partial update: absent fields keep their stored value.
pub async fn update_plant(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(mut input): JsonBody<PlantUpdate>,
) -> AppResult<Json<PlantView>> {
    if let Some(name) = input.name.as_deref() {
        input.name = Some(require_name("name", name)?);
    }
    if let Some(date) = input.last_watered {
        require_past_date("last_watered", date)?;
    }
    if let Some(type_id) = input.type_id {
        ensure_type_exists(&state, type_id).await?;
    }
    if !db::update_plant(&state.pool, id, &input).await? {
        return Err(AppError::not_found("plant", id));
    }
    load_view(&state, id).await.map(Json)
}

/// DELETE /api/plants/{id}
pub async fn delete_plant(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !db::delete_plant(&state.pool, id).await? {
        return Err(AppError::not_found("plant", id));
    }
    tracing::info!(plant_id = id, "plant deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/plants/{id}/water
pub async fn water_plant(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PlantView>> {
    if !db::mark_watered(&state.pool, id, watering::today()).await? {
        return Err(AppError::not_found("plant", id));
    }
    tracing::info!(plant_id = id, "plant watered");
    load_view(&state, id).await.map(Json)
}

/// GET /api/plant-types
pub async fn list_plant_types(State(state): State<AppState>) -> AppResult<Json<Vec<PlantType>>> {
    Ok(Json(db::list_plant_types(&state.pool).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpsertPlantType {
    pub name: String,
    pub summer_weeks: i64,
    pub winter_weeks: i64,
}

/// POST /api/plant-types
///
/// Creates the type, or replaces the rule of the type with the same
/// normalised name.
pub async fn upsert_plant_type(
    _session: RequireSession,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UpsertPlantType>,
) -> AppResult<(StatusCode, Json<PlantType>)> {
    let name = normalize_type_name(&input.name);
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let summer = require_interval("summer_weeks", input.summer_weeks, MAX_INTERVAL_WEEKS)?;
    let winter = require_interval("winter_weeks", input.winter_weeks, MAX_INTERVAL_WEEKS)?;
    let saved = db::upsert_plant_type(&state.pool, &name, summer, winter).await?;
    tracing::info!(type_id = saved.id, name = %saved.name, "plant type saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_type_names() {
        assert_eq!(normalize_type_name("  Snake   Plant "), "snake_plant");
        assert_eq!(normalize_type_name("Ficus\tLyrata"), "ficus_lyrata");
        assert_eq!(normalize_type_name("pothos"), "pothos");
        assert_eq!(normalize_type_name("   "), "");
    }

    #[test]
    fn view_carries_status() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let plant = PlantRow {
            id: 1,
            name: "Fern".into(),
            type_id: 4,
            type_name: "ficus".into(),
            last_watered: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
            summer_weeks: 1,
            winter_weeks: 2,
        };
        let view = PlantView::new(plant, today);
        assert_eq!(view.season, Season::Summer);
        assert!(view.status.is_due);
        assert_eq!(view.status_label, "today");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Fern");
        assert_eq!(json["interval_days"], 7);
        assert_eq!(json["state"], "today");
    }
}
