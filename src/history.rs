//! Chart-ready history: time windows, bucketing and averaging.
use crate::climate::round2;
use crate::model::{Reading, Source};
use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Period {
    #[serde(rename = "hour")]
    Hour,
    #[serde(rename = "12hours")]
    TwelveHours,
    #[default]
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "year")]
    Year,
}

/// How points inside a window are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Raw,
    Hourly,
    Daily,
}

impl Period {
    /// Unknown names fall back to a one-day window.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "hour" => Period::Hour,
            "12hours" => Period::TwelveHours,
            "week" => Period::Week,
            "month" => Period::Month,
            "year" => Period::Year,
            _ => Period::Day,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Hour => "hour",
            Period::TwelveHours => "12hours",
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            Period::Hour => Duration::hours(1),
            Period::TwelveHours => Duration::hours(12),
            Period::Day => Duration::days(1),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
            Period::Year => Duration::days(365),
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Period::Hour | Period::TwelveHours | Period::Day => Resolution::Raw,
            Period::Week => Resolution::Hourly,
            Period::Month | Period::Year => Resolution::Daily,
        }
    }

    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window()
    }
}

impl Resolution {
    fn label_format(&self) -> &'static str {
        match self {
            Resolution::Raw => "%H:%M",
            Resolution::Hourly => "%d/%m %Hh",
            Resolution::Daily => "%d/%m/%Y",
        }
    }

    fn bucket(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let step = match self {
            Resolution::Raw => return ts,
            Resolution::Hourly => Duration::hours(1),
            Resolution::Daily => Duration::days(1),
        };
        ts.duration_trunc(step).unwrap_or(ts)
    }
}

/// Parallel arrays, one entry per point or bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistorySeries {
    pub period: String,
    pub labels: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pressure: Vec<Option<f64>>,
    pub heat_index: Vec<f64>,
}

/// Every source gets its own series; outdoor and indoor values never share a bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistoryResponse {
    pub period: String,
    pub series: BTreeMap<Source, HistorySeries>,
}

#[derive(Default)]
struct Acc {
    n: usize,
    temperature: f64,
    humidity: f64,
    heat_index: f64,
    pressure: f64,
    pressure_n: usize,
}

impl Acc {
    fn add(&mut self, r: &Reading) {
        self.n += 1;
        self.temperature += r.temperature;
        self.humidity += r.humidity;
        self.heat_index += r.heat_index;
        if let Some(p) = r.pressure {
            self.pressure += p;
            self.pressure_n += 1;
        }
    }
}

/// Build the series for `period`. `readings` must be sorted by time; points
/// sharing a bucket are averaged and empty buckets never appear.
pub fn aggregate(period: Period, readings: &[Reading]) -> HistorySeries {
    aggregate_iter(period, readings.iter())
}

/// Split `readings` by source, then aggregate each part on its own.
/// Sources without readings are left out.
pub fn aggregate_by_source(period: Period, readings: &[Reading]) -> HistoryResponse {
    let mut grouped: BTreeMap<Source, Vec<&Reading>> = BTreeMap::new();
    for r in readings {
        grouped.entry(r.source).or_default().push(r);
    }
    HistoryResponse {
        period: period.as_str().to_string(),
        series: grouped
            .into_iter()
            .map(|(source, rs)| (source, aggregate_iter(period, rs.into_iter())))
            .collect(),
    }
}

fn aggregate_iter<'a>(period: Period, readings: impl Iterator<Item = &'a Reading>) -> HistorySeries {
    let resolution = period.resolution();
    let fmt = resolution.label_format();
    let mut out = HistorySeries {
        period: period.as_str().to_string(),
        ..Default::default()
    };

    let mut current: Option<(DateTime<Utc>, Acc)> = None;
    let flush = |bucket: DateTime<Utc>, acc: Acc, out: &mut HistorySeries| {
        let n = acc.n as f64;
        out.labels.push(bucket.format(fmt).to_string());
        out.temperature.push(round2(acc.temperature / n));
        out.humidity.push(round2(acc.humidity / n));
        out.heat_index.push(round2(acc.heat_index / n));
        out.pressure.push(if acc.pressure_n == 0 {
            None
        } else {
            Some(round2(acc.pressure / acc.pressure_n as f64))
        });
    };

    for r in readings {
        let bucket = resolution.bucket(r.recorded_at);
        if resolution != Resolution::Raw {
            if let Some((b, acc)) = current.as_mut() {
                if *b == bucket {
                    acc.add(r);
                    continue;
                }
            }
        }
        if let Some((b, acc)) = current.take() {
            flush(b, acc, &mut out);
        }
        let mut acc = Acc::default();
        acc.add(r);
        current = Some((bucket, acc));
    }
    if let Some((b, acc)) = current.take() {
        flush(b, acc, &mut out);
    }
    out
}
