use crate::climate::{heat_index, round2};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a reading came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Weather,
    Sensor,
    Esp32,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Weather, Source::Sensor, Source::Esp32];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Weather => "weather",
            Source::Sensor => "sensor",
            Source::Esp32 => "esp32",
        }
    }

    pub fn parse_source(s: &str) -> Option<Self> {
        match s {
            "weather" => Some(Source::Weather),
            "sensor" => Some(Source::Sensor),
            "esp32" => Some(Source::Esp32),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::parse_source(s).ok_or_else(|| format!("unknown source '{s}'"))
    }
}

/// Raw values as produced by a sensor or pushed by a device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub pressure: Option<f64>,
}

/// Extra fields only the weather API provides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherDetails {
    pub feels_like: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// A timestamped reading with its derived heat index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub source: Source,
    pub recorded_at: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: Option<f64>,
    pub heat_index: f64,
    #[serde(flatten)]
    pub details: WeatherDetails,
}

impl Reading {
    pub fn from_sample(source: Source, sample: Sample, recorded_at: DateTime<Utc>) -> Self {
        let temperature = round2(sample.temperature);
        let humidity = round2(sample.humidity);
        Self {
            source,
            recorded_at: recorded_at.trunc_subsecs(0),
            temperature,
            humidity,
            pressure: sample.pressure.map(round2),
            heat_index: heat_index(temperature, humidity),
            details: WeatherDetails::default(),
        }
    }

    pub fn now(source: Source, sample: Sample) -> Self {
        Self::from_sample(source, sample, Utc::now())
    }

    pub fn with_details(mut self, details: WeatherDetails) -> Self {
        self.details = details;
        self
    }
}
