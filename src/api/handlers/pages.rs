use askama::Template;
use axum::extract::State;
use axum::response::Html;

use super::plants::PlantView;
use super::tasks::TaskView;
use crate::advice::{self, Recommendation};
use crate::api::error::{AppError, AppResult};
use crate::api::state::AppState;
use crate::db;
use crate::model::Reading;
use crate::watering;

pub struct ReadingCard {
    pub source: String,
    pub temperature: String,
    pub humidity: String,
    pub heat_index: String,
    pub pressure: String,
    pub description: String,
    pub updated: String,
}

impl From<&Reading> for ReadingCard {
    fn from(r: &Reading) -> Self {
        Self {
            source: r.source.to_string(),
            temperature: format!("{:.1}", r.temperature),
            humidity: format!("{:.0}", r.humidity),
            heat_index: format!("{:.1}", r.heat_index),
            pressure: r.pressure.map(|p| format!("{p:.0} hPa")).unwrap_or_else(|| "-".into()),
            description: r.details.description.clone().unwrap_or_default(),
            updated: r.recorded_at.format("%H:%M").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub readings: Vec<ReadingCard>,
    pub plants: Vec<PlantView>,
    pub tasks: Vec<TaskView>,
    pub recommendation: Recommendation,
    pub version: &'static str,
}

/// GET /
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let today = watering::today();
    let latest: Vec<Reading> = state.cache.snapshot().await.into_values().collect();
    let plants = db::list_plants(&state.pool).await?;
    let tasks = db::list_tasks(&state.pool).await?;

    let page = IndexTemplate {
        readings: latest.iter().map(ReadingCard::from).collect(),
        plants: plants.into_iter().map(|p| PlantView::new(p, today)).collect(),
        tasks: tasks.into_iter().map(|t| TaskView::new(t, today)).collect(),
        recommendation: advice::recommend(&latest),
        version: env!("CARGO_PKG_VERSION"),
    };
    let html = page.render().map_err(|e| AppError::Internal(e.into()))?;
    Ok(Html(html))
}
