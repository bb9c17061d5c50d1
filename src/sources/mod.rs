//! Outbound collaborators: weather API, local sensor and chat notifications.
//!
//! Each is a trait so pollers and tests can swap the real client for a fake.

pub mod notify;
pub mod sensor;
pub mod weather;

pub use notify::{Notifier, TelegramNotifier};
pub use sensor::{CommandSensor, Sensor};
pub use weather::{OpenWeatherClient, WeatherProvider};
