//! Row models used by repositories.
//!
//! Keep these structs focused on the data returned by queries. Due-date
//! logic lives in `crate::watering`.

use crate::model::{Reading, Source, WeatherDetails};
use crate::watering::WateringRule;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct PlantType {
    pub id: i64,
    pub name: String,
    pub summer_weeks: i64,
    pub winter_weeks: i64,
}

/// A plant joined with its type's watering rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct PlantRow {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub type_name: String,
    pub last_watered: NaiveDate,
    pub summer_weeks: i64,
    pub winter_weeks: i64,
}

impl PlantRow {
    pub fn rule(&self) -> WateringRule {
        WateringRule {
            summer_weeks: self.summer_weeks,
            winter_weeks: self.winter_weeks,
        }
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantUpdate {
    pub name: Option<String>,
    pub type_id: Option<i64>,
    pub last_watered: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct HouseholdTask {
    pub id: i64,
    pub name: String,
    pub frequency_days: i64,
    pub last_completed: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub frequency_days: Option<i64>,
    pub last_completed: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Tip {
    pub id: i64,
    pub category: String,
    pub tip: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ReadingRow {
    pub recorded_at: DateTime<Utc>,
    pub source: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: Option<f64>,
    pub heat_index: f64,
}

impl ReadingRow {
    /// Rows with an unknown source name are skipped by callers.
    pub(crate) fn into_reading(self) -> Option<Reading> {
        let source = Source::parse_source(&self.source)?;
        Some(Reading {
            source,
            recorded_at: self.recorded_at,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
            heat_index: self.heat_index,
            details: WeatherDetails::default(),
        })
    }
}
