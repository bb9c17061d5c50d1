pub mod auth;
pub mod health;
pub mod pages;
pub mod plants;
pub mod readings;
pub mod tasks;
pub mod tips;

use chrono::NaiveDate;

use crate::api::error::AppError;
use crate::watering;

/// Ten years, in the unit each interval is stored in.
pub const MAX_INTERVAL_WEEKS: i64 = 520;
pub const MAX_INTERVAL_DAYS: i64 = 3650;

/// Trimmed display name; empty names are rejected.
pub(crate) fn require_name(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_interval(field: &str, value: i64, max: i64) -> Result<i64, AppError> {
    if !(1..=max).contains(&value) {
        return Err(AppError::BadRequest(format!("{field} must be between 1 and {max}")));
    }
    Ok(value)
}

/// Service dates may not lie after the household's current day.
pub(crate) fn require_past_date(field: &str, value: NaiveDate) -> Result<NaiveDate, AppError> {
    if value > watering::today() {
        return Err(AppError::BadRequest(format!("{field} must not be in the future")));
    }
    Ok(value)
}
