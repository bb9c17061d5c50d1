//! Periodic jobs: weather and sensor polling, and the reminder sweep.
//!
//! Every job does at most one outbound call per tick. Errors are logged and
//! the loop simply waits for the next tick.
use crate::cache::LatestReadings;
use crate::config::Config;
use crate::db::{self, Pool};
use crate::model::{Reading, Source};
use crate::sources::{CommandSensor, Notifier, OpenWeatherClient, Sensor, WeatherProvider};
use crate::watering::{watering_status, DueStatus};
use anyhow::Result;
use chrono::NaiveDate;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

/// Store a reading and publish it as the latest for its source.
#[instrument(skip_all, fields(source = %reading.source))]
pub async fn record(pool: &Pool, cache: &LatestReadings, reading: Reading) -> Result<Reading> {
    db::insert_reading(pool, &reading).await?;
    cache.update(reading.clone()).await;
    Ok(reading)
}

pub async fn poll_weather(
    pool: &Pool,
    cache: &LatestReadings,
    provider: &dyn WeatherProvider,
) -> Result<Reading> {
    let reading = provider.current().await?;
    let reading = record(pool, cache, reading).await?;
    info!(
        temperature = reading.temperature,
        humidity = reading.humidity,
        "weather reading stored"
    );
    Ok(reading)
}

pub async fn poll_sensor(pool: &Pool, cache: &LatestReadings, sensor: &dyn Sensor) -> Result<Reading> {
    let sample = sensor.read().await?;
    let reading = record(pool, cache, Reading::now(Source::Sensor, sample)).await?;
    info!(
        temperature = reading.temperature,
        humidity = reading.humidity,
        heat_index = reading.heat_index,
        "sensor reading stored"
    );
    Ok(reading)
}

/// The configured reading sources. Either may be absent.
#[derive(Clone, Default)]
pub struct Collectors {
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub sensor: Option<Arc<dyn Sensor>>,
}

impl Collectors {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let weather: Option<Arc<dyn WeatherProvider>> = if cfg.weather.enabled {
            Some(Arc::new(OpenWeatherClient::from_config(&cfg.weather)?))
        } else {
            None
        };
        let sensor: Option<Arc<dyn Sensor>> = if cfg.sensor.enabled {
            Some(Arc::new(CommandSensor::new(&cfg.sensor.command)?))
        } else {
            None
        };
        Ok(Self { weather, sensor })
    }

    /// Poll every configured source once, concurrently.
    pub async fn refresh_all(
        &self,
        pool: &Pool,
        cache: &LatestReadings,
    ) -> Vec<(Source, Result<Reading>)> {
        let mut jobs: Vec<BoxFuture<'_, (Source, Result<Reading>)>> = Vec::new();
        if let Some(weather) = &self.weather {
            jobs.push(
                async move { (Source::Weather, poll_weather(pool, cache, weather.as_ref()).await) }
                    .boxed(),
            );
        }
        if let Some(sensor) = &self.sensor {
            jobs.push(
                async move { (Source::Sensor, poll_sensor(pool, cache, sensor.as_ref()).await) }
                    .boxed(),
            );
        }
        join_all(jobs).await
    }
}

/// Everything that needs attention on a given day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueItems {
    pub plants: Vec<String>,
    pub tasks: Vec<String>,
}

impl DueItems {
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty() && self.tasks.is_empty()
    }

    /// Reminder text, or `None` when nothing is due.
    pub fn reminder_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut sections = Vec::new();
        if !self.plants.is_empty() {
            sections.push(format!("💧 Watering reminder!\n- {}", self.plants.join("\n- ")));
        }
        if !self.tasks.is_empty() {
            sections.push(format!("🧹 Household tasks due:\n- {}", self.tasks.join("\n- ")));
        }
        Some(sections.join("\n\n"))
    }
}

#[instrument(skip_all)]
pub async fn due_items(pool: &Pool, today: NaiveDate) -> Result<DueItems> {
    let plants = db::list_plants(pool)
        .await?
        .into_iter()
        .filter(|p| watering_status(p.last_watered, p.rule(), today).is_due)
        .map(|p| p.name)
        .collect();
    let tasks = db::list_tasks(pool)
        .await?
        .into_iter()
        .filter(|t| DueStatus::compute(t.last_completed, t.frequency_days, today).is_due)
        .map(|t| t.name)
        .collect();
    Ok(DueItems { plants, tasks })
}

/// Send one reminder listing everything due. Returns the number of items.
pub async fn sweep(pool: &Pool, notifier: &dyn Notifier, today: NaiveDate) -> Result<usize> {
    let due = due_items(pool, today).await?;
    let Some(text) = due.reminder_text() else {
        return Ok(0);
    };
    notifier.send(&text).await?;
    let count = due.plants.len() + due.tasks.len();
    info!(plants = due.plants.len(), tasks = due.tasks.len(), "reminder sent");
    Ok(count)
}

/// Run `job` every `period` after `initial_delay`, until the handle is aborted.
pub fn spawn_every<F, Fut, T>(
    name: &'static str,
    initial_delay: Duration,
    period: Duration,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        if !initial_delay.is_zero() {
            tokio::time::sleep(initial_delay).await;
        }
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(job = name, period_secs = period.as_secs(), "periodic job started");
        loop {
            ticker.tick().await;
            let run = job();
            if let Err(err) = run.await {
                warn!(job = name, ?err, "periodic job failed");
            }
        }
    })
}

/// Start every background job the configuration enables.
pub fn spawn_all(
    cfg: &Config,
    pool: &Pool,
    cache: &Arc<LatestReadings>,
    collectors: &Collectors,
    notifier: Option<Arc<dyn Notifier>>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    if let Some(weather) = collectors.weather.clone() {
        let (pool, cache) = (pool.clone(), cache.clone());
        handles.push(spawn_every("weather", Duration::ZERO, cfg.weather.poll_interval(), move || {
            let (pool, cache, weather) = (pool.clone(), cache.clone(), weather.clone());
            async move { poll_weather(&pool, &cache, weather.as_ref()).await }
        }));
    }

    if let Some(sensor) = collectors.sensor.clone() {
        let (pool, cache) = (pool.clone(), cache.clone());
        handles.push(spawn_every("sensor", Duration::ZERO, cfg.sensor.poll_interval(), move || {
            let (pool, cache, sensor) = (pool.clone(), cache.clone(), sensor.clone());
            async move { poll_sensor(&pool, &cache, sensor.as_ref()).await }
        }));
    }

    if let Some(notifier) = notifier {
        let pool = pool.clone();
        handles.push(spawn_every(
            "reminders",
            cfg.telegram.initial_delay(),
            cfg.telegram.sweep_interval(),
            move || {
                let (pool, notifier) = (pool.clone(), notifier.clone());
                async move { sweep(&pool, notifier.as_ref(), crate::watering::today()).await }
            },
        ));
    }

    handles
}
