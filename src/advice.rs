//! Comfort advice derived from the latest readings.
use crate::model::{Reading, Source};
use serde::Serialize;

pub const HOT_HEAT_INDEX: f64 = 32.0;
pub const HUMID_PERCENT: f64 = 65.0;
pub const DRY_PERCENT: f64 = 30.0;
pub const COLD_CELSIUS: f64 = 17.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub message: String,
    pub icon: &'static str,
}

impl Recommendation {
    fn new(message: impl Into<String>, icon: &'static str) -> Self {
        Self {
            message: message.into(),
            icon,
        }
    }
}

/// The freshest indoor reading: the local sensor or the pushed ESP32 one.
pub fn indoor<'a>(latest: &'a [Reading]) -> Option<&'a Reading> {
    latest
        .iter()
        .filter(|r| matches!(r.source, Source::Sensor | Source::Esp32))
        .max_by_key(|r| r.recorded_at)
}

pub fn outdoor(latest: &[Reading]) -> Option<&Reading> {
    latest.iter().find(|r| r.source == Source::Weather)
}

/// First matching rule wins; the order puts health-related advice first.
pub fn recommend(latest: &[Reading]) -> Recommendation {
    let inside = indoor(latest);
    let outside = outdoor(latest);

    let Some(inside) = inside else {
        return match outside {
            Some(out) => Recommendation::new(
                format!(
                    "No indoor reading yet. Outside it is {:.1}°C with {:.0}% humidity.",
                    out.temperature, out.humidity
                ),
                "fa-cloud-sun",
            ),
            None => Recommendation::new("No readings available yet.", "fa-circle-question"),
        };
    };

    if inside.heat_index >= HOT_HEAT_INDEX {
        return Recommendation::new(
            format!(
                "It feels like {:.1}°C indoors. Close the blinds and drink water.",
                inside.heat_index
            ),
            "fa-temperature-high",
        );
    }
    if inside.humidity > HUMID_PERCENT {
        let drier_outside = outside.is_some_and(|o| o.humidity < inside.humidity);
        let message = if drier_outside {
            "Indoor humidity is high and the air outside is drier. Air the room for a few minutes."
        } else {
            "Indoor humidity is high. Air the room when the weather allows."
        };
        return Recommendation::new(message, "fa-wind");
    }
    if inside.humidity < DRY_PERCENT {
        return Recommendation::new(
            "The air is dry. A humidifier or a few plants will help.",
            "fa-droplet",
        );
    }
    if inside.temperature < COLD_CELSIUS {
        return Recommendation::new(
            format!("It is {:.1}°C indoors. Consider turning the heating up.", inside.temperature),
            "fa-snowflake",
        );
    }
    if let Some(out) = outside {
        if inside.temperature > 24.0 && out.temperature + 3.0 <= inside.temperature {
            return Recommendation::new(
                "It is cooler outside than inside. Open the windows to cool down.",
                "fa-window-maximize",
            );
        }
    }
    Recommendation::new(
        "Conditions are comfortable. Air the room if indoor humidity rises.",
        "fa-lightbulb",
    )
}
