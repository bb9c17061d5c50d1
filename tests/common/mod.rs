#![allow(dead_code)]

use anyhow::{anyhow, Result};
use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use homewatch::api::{build_router, AppState};
use homewatch::cache::LatestReadings;
use homewatch::config::{self, Config};
use homewatch::db::{self, Pool};
use homewatch::model::{Reading, Sample, Source};
use homewatch::poller::Collectors;
use homewatch::sources::{Notifier, Sensor, WeatherProvider};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub async fn setup_pool() -> Pool {
    let pool = db::init_pool("sqlite::memory:").await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// The example config with every outbound integration switched off.
pub fn test_config(require_auth: bool) -> Config {
    let mut cfg: Config = serde_yaml::from_str(config::example()).unwrap();
    cfg.weather.enabled = false;
    cfg.sensor.enabled = false;
    cfg.telegram.enabled = false;
    cfg.http.require_auth = require_auth;
    cfg
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with(false, Collectors::default()).await
    }

    pub async fn with(require_auth: bool, collectors: Collectors) -> Self {
        let pool = setup_pool().await;
        let state = AppState::new(
            pool,
            Arc::new(LatestReadings::new()),
            collectors,
            test_config(require_auth),
        );
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub async fn raw(&self, req: Request<Body>) -> (StatusCode, Bytes) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes)
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.raw(req).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, None, None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, Some(body), None)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, Some(body), None)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, None, None)).await
    }
}

pub fn request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn sample(temperature: f64, humidity: f64) -> Sample {
    Sample {
        temperature,
        humidity,
        pressure: None,
    }
}

/// Weather provider replaying queued results; `Ok` with 18°C/60% once empty.
#[derive(Clone, Default)]
pub struct FakeWeather {
    responses: Arc<Mutex<VecDeque<Result<Sample>>>>,
    pub calls: Arc<Mutex<usize>>,
}

impl FakeWeather {
    pub fn with_responses(responses: Vec<Result<Sample>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    pub async fn calls(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait::async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self) -> Result<Reading> {
        *self.calls.lock().await += 1;
        let next = self.responses.lock().await.pop_front();
        let sample = next.unwrap_or_else(|| Ok(sample(18.0, 60.0)))?;
        Ok(Reading::now(Source::Weather, sample))
    }
}

/// Sensor that always returns the same sample, or always fails.
#[derive(Clone)]
pub struct FakeSensor {
    pub sample: Option<Sample>,
}

#[async_trait::async_trait]
impl Sensor for FakeSensor {
    async fn read(&self) -> Result<Sample> {
        self.sample.ok_or_else(|| anyhow!("sensor unplugged"))
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub async fn messages(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("telegram unreachable"));
        }
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }
}
