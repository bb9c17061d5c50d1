mod common;

use anyhow::anyhow;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use common::{sample, setup_pool, FakeSensor, FakeWeather, RecordingNotifier};
use homewatch::cache::LatestReadings;
use homewatch::db;
use homewatch::model::Source;
use homewatch::poller::{self, Collectors};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn weather_poll_stores_and_caches() {
    let pool = setup_pool().await;
    let cache = LatestReadings::new();
    let weather = FakeWeather::with_responses(vec![Ok(sample(31.0, 65.0))]);

    let reading = poller::poll_weather(&pool, &cache, &weather).await.unwrap();
    assert_eq!(reading.source, Source::Weather);
    assert!(reading.heat_index > reading.temperature);

    let cached = cache.get(Source::Weather).await.unwrap();
    assert_eq!(cached, reading);
    let stored = db::readings_since(&pool, Utc::now() - ChronoDuration::minutes(5), None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].temperature, 31.0);
}

#[tokio::test]
async fn failed_poll_leaves_state_untouched() {
    let pool = setup_pool().await;
    let cache = LatestReadings::new();
    let weather = FakeWeather::with_responses(vec![Err(anyhow!("city not found"))]);

    let err = poller::poll_weather(&pool, &cache, &weather).await.unwrap_err();
    assert!(err.to_string().contains("city not found"));
    assert!(cache.get(Source::Weather).await.is_none());

    let sensor = FakeSensor { sample: None };
    assert!(poller::poll_sensor(&pool, &cache, &sensor).await.is_err());
    assert!(cache.snapshot().await.is_empty());

    let stored = db::readings_since(&pool, Utc::now() - ChronoDuration::days(1), None)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn refresh_all_reports_each_source() {
    let pool = setup_pool().await;
    let cache = LatestReadings::new();
    let collectors = Collectors {
        weather: Some(Arc::new(FakeWeather::default())),
        sensor: Some(Arc::new(FakeSensor { sample: Some(sample(21.5, 45.0)) })),
    };

    let results = collectors.refresh_all(&pool, &cache).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(cache.get(Source::Sensor).await.unwrap().temperature, 21.5);

    let none = Collectors::default().refresh_all(&pool, &cache).await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn sweep_sends_one_reminder_for_due_items() {
    let pool = setup_pool().await;
    let notifier = RecordingNotifier::default();
    // July: summer rules apply; ficus is weekly, echeveria every two weeks.
    let today = day(2024, 7, 20);
    let ficus = db::get_plant_type_by_name(&pool, "ficus").await.unwrap().unwrap();
    let echeveria = db::get_plant_type_by_name(&pool, "echeveria").await.unwrap().unwrap();

    db::insert_plant(&pool, "Ficus", ficus.id, day(2024, 7, 13)).await.unwrap();
    db::insert_plant(&pool, "Echeveria", echeveria.id, day(2024, 7, 13)).await.unwrap();
    db::insert_task(&pool, "Change sheets", 7, day(2024, 7, 1)).await.unwrap();
    db::insert_task(&pool, "Clean filter", 30, day(2024, 7, 1)).await.unwrap();

    let due = poller::due_items(&pool, today).await.unwrap();
    assert_eq!(due.plants, vec!["Ficus".to_string()]);
    assert_eq!(due.tasks, vec!["Change sheets".to_string()]);

    let count = poller::sweep(&pool, &notifier, today).await.unwrap();
    assert_eq!(count, 2);
    let sent = notifier.messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("- Ficus"));
    assert!(sent[0].contains("- Change sheets"));
    assert!(!sent[0].contains("Echeveria"));
}

#[tokio::test]
async fn sweep_is_silent_when_nothing_is_due() {
    let pool = setup_pool().await;
    let notifier = RecordingNotifier::default();
    let today = day(2024, 1, 10);
    let pothos = db::get_plant_type_by_name(&pool, "pothos").await.unwrap().unwrap();
    // Winter: pothos every three weeks.
    db::insert_plant(&pool, "Pothos", pothos.id, day(2024, 1, 1)).await.unwrap();

    assert_eq!(poller::sweep(&pool, &notifier, today).await.unwrap(), 0);
    assert!(notifier.messages().await.is_empty());
}

#[tokio::test]
async fn sweep_surfaces_notifier_errors() {
    let pool = setup_pool().await;
    let notifier = RecordingNotifier { fail: true, ..Default::default() };
    db::insert_task(&pool, "Water balcony", 1, day(2024, 5, 1)).await.unwrap();

    let err = poller::sweep(&pool, &notifier, day(2024, 5, 3)).await.unwrap_err();
    assert!(err.to_string().contains("unreachable"));
}

#[tokio::test]
async fn periodic_job_keeps_running_after_errors() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let handle = poller::spawn_every("test", Duration::ZERO, Duration::from_millis(10), move || {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 0 {
                Err(anyhow!("flaky"))
            } else {
                Ok(())
            }
        }
    });

    let reached = tokio::time::timeout(Duration::from_secs(2), async {
        while runs.load(Ordering::SeqCst) < 4 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    handle.abort();
    assert!(reached.is_ok(), "job stopped after {} runs", runs.load(Ordering::SeqCst));
}
