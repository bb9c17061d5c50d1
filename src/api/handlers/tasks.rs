use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require_interval, require_name, require_past_date, MAX_INTERVAL_DAYS};
use crate::api::error::{AppError, AppResult};
use crate::api::extract::{JsonBody, RequireSession};
use crate::api::state::AppState;
use crate::db::{self, HouseholdTask, TaskUpdate};
use crate::watering::{self, DueStatus};

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: HouseholdTask,
    #[serde(flatten)]
    pub status: DueStatus,
    pub status_label: String,
}

impl TaskView {
    pub fn new(task: HouseholdTask, today: NaiveDate) -> Self {
        let status = DueStatus::compute(task.last_completed, task.frequency_days, today);
        Self {
            status_label: status.label(),
            status,
            task,
        }
    }
}

async fn load_view(state: &AppState, id: i64) -> AppResult<TaskView> {
    let task = db::get_task(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("task", id))?;
    Ok(TaskView::new(task, watering::today()))
}

/// GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>) -> AppResult<Json<Vec<TaskView>>> {
    let today = watering::today();
    let tasks = db::list_tasks(&state.pool).await?;
    Ok(Json(tasks.into_iter().map(|t| TaskView::new(t, today)).collect()))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TaskView>> {
    load_view(&state, id).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub frequency_days: i64,
    pub last_completed: Option<NaiveDate>,
}

/// POST /api/tasks
pub async fn create_task(
    _session: RequireSession,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTask>,
) -> AppResult<(StatusCode, Json<TaskView>)> {
    let name = require_name("name", &input.name)?;
    let frequency = require_interval("frequency_days", input.frequency_days, MAX_INTERVAL_DAYS)?;
    let last = match input.last_completed {
        Some(date) => require_past_date("last_completed", date)?,
        None => watering::today(),
    };
    let id = db::insert_task(&state.pool, &name, frequency, last).await?;
    tracing::info!(task_id = id, name = %name, "task added");
    Ok((StatusCode::CREATED, Json(load_view(&state, id).await?)))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(mut input): JsonBody<TaskUpdate>,
) -> AppResult<Json<TaskView>> {
    if let Some(name) = input.name.as_deref() {
        input.name = Some(require_name("name", name)?);
    }
    if let Some(freq) = input.frequency_days {
        require_interval("frequency_days", freq, MAX_INTERVAL_DAYS)?;
    }
    if let Some(date) = input.last_completed {
        require_past_date("last_completed", date)?;
    }
    if !db::update_task(&state.pool, id, &input).await? {
        return Err(AppError::not_found("task", id));
    }
    load_view(&state, id).await.map(Json)
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !db::delete_task(&state.pool, id).await? {
        return Err(AppError::not_found("task", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/{id}/complete
pub async fn complete_task(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TaskView>> {
    if !db::complete_task(&state.pool, id, watering::today()).await? {
        return Err(AppError::not_found("task", id));
    }
    tracing::info!(task_id = id, "task completed");
    load_view(&state, id).await.map(Json)
}
