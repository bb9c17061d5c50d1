//! Latest reading per source, shared between pollers and HTTP handlers.
use crate::model::{Reading, Source};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct LatestReadings {
    inner: Mutex<BTreeMap<Source, Reading>>,
}

impl LatestReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored reading for `reading.source`. Older readings never
    /// overwrite newer ones.
    pub async fn update(&self, reading: Reading) {
        let mut guard = self.inner.lock().await;
        match guard.get(&reading.source) {
            Some(current) if current.recorded_at > reading.recorded_at => {}
            _ => {
                guard.insert(reading.source, reading);
            }
        }
    }

    pub async fn get(&self, source: Source) -> Option<Reading> {
        self.inner.lock().await.get(&source).cloned()
    }

    pub async fn snapshot(&self) -> BTreeMap<Source, Reading> {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sample;
    use chrono::{Duration, Utc};

    fn sample(t: f64) -> Sample {
        Sample { temperature: t, humidity: 50.0, pressure: None }
    }

    #[tokio::test]
    async fn keeps_latest_per_source() {
        let cache = LatestReadings::new();
        assert!(cache.get(Source::Sensor).await.is_none());

        let now = Utc::now();
        cache.update(Reading::from_sample(Source::Sensor, sample(20.0), now)).await;
        cache.update(Reading::from_sample(Source::Weather, sample(12.0), now)).await;
        cache
            .update(Reading::from_sample(Source::Sensor, sample(21.0), now + Duration::seconds(60)))
            .await;
        // stale value is ignored
        cache
            .update(Reading::from_sample(Source::Sensor, sample(5.0), now - Duration::seconds(60)))
            .await;

        assert_eq!(cache.get(Source::Sensor).await.unwrap().temperature, 21.0);
        let snap = cache.snapshot().await;
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[&Source::Weather].temperature, 12.0);
    }
}
