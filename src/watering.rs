//! Due-date arithmetic for plants and recurring household tasks.
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "summer",
            Season::Winter => "winter",
        }
    }
}

/// The household's calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// November through April count as winter.
pub fn season_for(date: NaiveDate) -> Season {
    match date.month() {
        11 | 12 | 1 | 2 | 3 | 4 => Season::Winter,
        _ => Season::Summer,
    }
}

/// Seasonal watering interval, in weeks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WateringRule {
    pub summer_weeks: i64,
    pub winter_weeks: i64,
}

impl WateringRule {
    pub fn weeks_for(&self, season: Season) -> i64 {
        match season {
            Season::Summer => self.summer_weeks,
            Season::Winter => self.winter_weeks,
        }
    }

    pub fn interval_days(&self, today: NaiveDate) -> i64 {
        self.weeks_for(season_for(today)).saturating_mul(7)
    }
}

pub fn is_due(last_date: NaiveDate, freq_weeks: i64, today: NaiveDate) -> bool {
    (today - last_date).num_days() >= freq_weeks.saturating_mul(7)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DueState {
    Upcoming,
    Today,
    Overdue,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DueStatus {
    pub days_since: i64,
    pub interval_days: i64,
    pub days_until: i64,
    pub is_due: bool,
    pub state: DueState,
}

impl DueStatus {
    pub fn compute(last_date: NaiveDate, interval_days: i64, today: NaiveDate) -> Self {
        let days_since = (today - last_date).num_days();
        let days_until = interval_days.saturating_sub(days_since);
        let state = match days_until {
            d if d > 0 => DueState::Upcoming,
            0 => DueState::Today,
            _ => DueState::Overdue,
        };
        Self {
            days_since,
            interval_days,
            days_until,
            is_due: days_until <= 0,
            state,
        }
    }

    pub fn label(&self) -> String {
        match self.state {
            DueState::Upcoming if self.days_until == 1 => "in 1 day".to_string(),
            DueState::Upcoming => format!("in {} days", self.days_until),
            DueState::Today => "today".to_string(),
            DueState::Overdue if self.days_until == -1 => "overdue by 1 day".to_string(),
            DueState::Overdue => format!("overdue by {} days", self.days_until.unsigned_abs()),
        }
    }
}

/// Status of a plant under its type's seasonal rule.
pub fn watering_status(last_watered: NaiveDate, rule: WateringRule, today: NaiveDate) -> DueStatus {
    DueStatus::compute(last_watered, rule.interval_days(today), today)
}
