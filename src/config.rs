//! Configuration loader and validator for the home monitor.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub app: App,
    pub http: Http,
    pub weather: Weather,
    pub sensor: Sensor,
    pub telegram: Telegram,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Http {
    pub bind: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Require a session token on mutating API routes.
    #[serde(default)]
    pub require_auth: bool,
    /// Sessions older than this are refused and swept.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
}

/// OpenWeatherMap polling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weather {
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    /// `metric`, `imperial` or `standard`; readings are stored in °C either way.
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_weather_base")]
    pub base_url: String,
    #[serde(default = "default_weather_interval")]
    pub poll_interval_secs: u64,
}

/// Local sensor polling settings. `command` is run once per tick and must
/// print a single reading on stdout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sensor {
    pub enabled: bool,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default = "default_sensor_interval")]
    pub poll_interval_secs: u64,
}

/// Telegram reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: i64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_session_ttl() -> u64 {
    24 * 30
}

fn default_units() -> String {
    "metric".into()
}

fn default_lang() -> String {
    "en".into()
}

fn default_weather_base() -> String {
    "https://api.openweathermap.org/".into()
}

fn default_weather_interval() -> u64 {
    900
}

fn default_sensor_interval() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_initial_delay() -> u64 {
    60
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }

    /// `DATABASE_URL` wins over the default file inside `app.data_dir`.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "sqlite://{}/homewatch.db",
                self.app.data_dir.trim_end_matches('/')
            )
        })
    }
}

impl Http {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours.saturating_mul(3600))
    }
}

impl Weather {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Sensor {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Telegram {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

pub const WEATHER_UNITS: [&str; 3] = ["metric", "imperial", "standard"];

/// Validate a configuration instance. Credentials are only required for
/// integrations that are enabled.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.http.bind.trim().is_empty() {
        return Err(ConfigError::Invalid("http.bind must be non-empty"));
    }
    if cfg.http.request_timeout_secs == 0 {
        return Err(ConfigError::Invalid("http.request_timeout_secs must be > 0"));
    }
    if cfg.http.session_ttl_hours == 0 {
        return Err(ConfigError::Invalid("http.session_ttl_hours must be > 0"));
    }

    if cfg.weather.enabled {
        if cfg.weather.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("weather.api_key must be non-empty"));
        }
        if !(-90.0..=90.0).contains(&cfg.weather.latitude) {
            return Err(ConfigError::Invalid("weather.latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&cfg.weather.longitude) {
            return Err(ConfigError::Invalid("weather.longitude must be within [-180, 180]"));
        }
        if cfg.weather.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("weather.poll_interval_secs must be > 0"));
        }
        if !WEATHER_UNITS.contains(&cfg.weather.units.as_str()) {
            return Err(ConfigError::Invalid(
                "weather.units must be one of metric, imperial, standard",
            ));
        }
    }

    if cfg.sensor.enabled {
        if cfg.sensor.command.is_empty() || cfg.sensor.command[0].trim().is_empty() {
            return Err(ConfigError::Invalid("sensor.command must name a program"));
        }
        if cfg.sensor.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("sensor.poll_interval_secs must be > 0"));
        }
    }

    if cfg.telegram.enabled {
        if cfg.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::Invalid("telegram.bot_token must be non-empty"));
        }
        if cfg.telegram.chat_id == 0 {
            return Err(ConfigError::Invalid("telegram.chat_id must be set"));
        }
        if cfg.telegram.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid("telegram.sweep_interval_secs must be > 0"));
        }
    }

    Ok(())
}

/// Example configuration, also used as the fixture for tests.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

http:
  bind: "0.0.0.0:5000"
  request_timeout_secs: 30
  require_auth: false
  session_ttl_hours: 720

weather:
  enabled: true
  api_key: "YOUR_OPENWEATHERMAP_API_KEY"
  latitude: 48.85
  longitude: 2.35
  units: "metric"
  lang: "en"
  poll_interval_secs: 900

sensor:
  enabled: true
  command: ["python3", "read_sensor.py"]
  poll_interval_secs: 60

telegram:
  enabled: true
  bot_token: "YOUR_TELEGRAM_BOT_TOKEN"
  chat_id: 123456789
  sweep_interval_secs: 3600
  initial_delay_secs: 60
"#
}
