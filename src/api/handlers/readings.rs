//! Latest readings, manual refresh, history charts and device ingestion.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::advice::{self, Recommendation};
use crate::api::error::{AppError, AppResult};
use crate::api::extract::{JsonBody, RequireSession};
use crate::api::state::AppState;
use crate::db;
use crate::history::{self, HistoryResponse, Period};
use crate::model::{Reading, Sample, Source};
use crate::poller;

fn parse_source(raw: &str) -> AppResult<Source> {
    Source::parse_source(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unknown source '{raw}', expected one of weather, sensor, esp32"
        ))
    })
}

/// GET /api/readings
pub async fn latest_all(State(state): State<AppState>) -> Json<BTreeMap<Source, Reading>> {
    Json(state.cache.snapshot().await)
}

/// GET /api/readings/{source}
pub async fn latest_one(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> AppResult<Json<Reading>> {
    let source = parse_source(&source)?;
    state
        .cache
        .get(source)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no {source} reading yet")))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub readings: BTreeMap<Source, Reading>,
    pub errors: BTreeMap<Source, String>,
}

/// POST /api/refresh
///
/// Polls every configured source once. Failures are reported per source and
/// do not fail the request.
pub async fn refresh(
    _session: RequireSession,
    State(state): State<AppState>,
) -> Json<RefreshResponse> {
    let mut errors = BTreeMap::new();
    for (source, result) in state.collectors.refresh_all(&state.pool, &state.cache).await {
        if let Err(err) = result {
            tracing::warn!(%source, error = ?err, "manual refresh failed");
            errors.insert(source, format!("{err:#}"));
        }
    }
    Json(RefreshResponse {
        readings: state.cache.snapshot().await,
        errors,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub period: Option<String>,
    pub source: Option<String>,
}

/// GET /api/history?period=&source=
///
/// One series per source; `source` narrows the response to that series.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<HistoryResponse>> {
    let period = params
        .period
        .as_deref()
        .map(Period::parse_lenient)
        .unwrap_or_default();
    let source = params
        .source
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_source)
        .transpose()?;
    let readings = db::readings_since(&state.pool, period.since(Utc::now()), source).await?;
    Ok(Json(history::aggregate_by_source(period, &readings)))
}

/// GET /api/recommendation
pub async fn recommendation(State(state): State<AppState>) -> Json<Recommendation> {
    let latest: Vec<Reading> = state.cache.snapshot().await.into_values().collect();
    Json(advice::recommend(&latest))
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub reading: Reading,
}

/// POST /api/esp32/data
pub async fn ingest_esp32(
    _session: RequireSession,
    State(state): State<AppState>,
    JsonBody(sample): JsonBody<Sample>,
) -> AppResult<Json<IngestResponse>> {
    if !sample.temperature.is_finite() || !sample.humidity.is_finite() {
        return Err(AppError::BadRequest("temperature and humidity must be numbers".into()));
    }
    if !(0.0..=100.0).contains(&sample.humidity) {
        return Err(AppError::BadRequest("humidity must be between 0 and 100".into()));
    }
    let reading = poller::record(&state.pool, &state.cache, Reading::now(Source::Esp32, sample)).await?;
    tracing::info!(
        temperature = reading.temperature,
        humidity = reading.humidity,
        "esp32 reading received"
    );
    Ok(Json(IngestResponse {
        status: "success",
        reading,
    }))
}
