use crate::climate::{fahrenheit_to_celsius, round2};
use crate::config;
use crate::model::{Reading, Sample, Source, WeatherDetails};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions as a weather-sourced reading.
    async fn current(&self) -> Result<Reading>;
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: Url,
    api_key: String,
    latitude: f64,
    longitude: f64,
    units: Units,
    lang: String,
}

/// Unit system requested from the API. Readings are always kept in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "metric" => Some(Units::Metric),
            "imperial" => Some(Units::Imperial),
            "standard" => Some(Units::Standard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    /// Temperatures arrive in °C, °F or K respectively.
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => fahrenheit_to_celsius(value),
            Units::Standard => value - 273.15,
        }
    }
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: Option<f64>,
    humidity: f64,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl OpenWeatherClient {
    pub fn from_config(cfg: &config::Weather) -> Result<Self> {
        let base_url = Url::parse(&cfg.base_url).context("invalid weather.base_url")?;
        let units = Units::parse(&cfg.units)
            .ok_or_else(|| anyhow!("unsupported weather.units '{}'", cfg.units))?;
        let http = Client::builder()
            .user_agent(concat!("homewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url,
            api_key: cfg.api_key.clone(),
            latitude: cfg.latitude,
            longitude: cfg.longitude,
            units,
            lang: cfg.lang.clone(),
        })
    }

    pub fn build_request(&self) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join("data/2.5/weather")
            .context("invalid weather base URL")?;
        self.http
            .get(endpoint)
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.as_str().to_string()),
                ("lang", self.lang.clone()),
            ])
            .build()
            .context("failed to build weather request")
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self) -> Result<Reading> {
        let request = self.build_request()?;
        debug!(url = %request.url().path(), "requesting current weather");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach weather API")?;

        let status = res.status();
        let body = res.text().await.context("failed to read weather response")?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(anyhow!("weather API error {}: {}", status, message));
        }
        parse_current(&body, self.units)
    }
}

/// Map an OpenWeatherMap "current weather" body, requested in `units`, into
/// a reading in °C.
pub fn parse_current(body: &str, units: Units) -> Result<Reading> {
    let payload: CurrentResponse =
        serde_json::from_str(body).context("invalid weather response")?;
    let condition = payload.weather.into_iter().next();
    let details = WeatherDetails {
        feels_like: payload.main.feels_like.map(|t| round2(units.to_celsius(t))),
        description: condition.as_ref().map(|c| capitalize(&c.description)),
        icon: condition.map(|c| c.icon),
    };
    let sample = Sample {
        temperature: units.to_celsius(payload.main.temp),
        humidity: payload.main.humidity,
        pressure: payload.main.pressure,
    };
    Ok(Reading::now(Source::Weather, sample).with_details(details))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "weather": [{"id": 500, "main": "Rain", "description": "légère pluie", "icon": "10d"}],
        "main": {"temp": 18.42, "feels_like": 17.9, "temp_min": 17.0, "temp_max": 19.1,
                 "pressure": 1012, "humidity": 72},
        "name": "Paris"
    }"#;

    #[test]
    fn parses_current_weather() {
        let r = parse_current(BODY, Units::Metric).unwrap();
        assert_eq!(r.source, Source::Weather);
        assert_eq!(r.temperature, 18.42);
        assert_eq!(r.humidity, 72.0);
        assert_eq!(r.pressure, Some(1012.0));
        assert_eq!(r.heat_index, 18.42);
        assert_eq!(r.details.description.as_deref(), Some("Légère pluie"));
        assert_eq!(r.details.icon.as_deref(), Some("10d"));
    }

    #[test]
    fn rejects_body_without_main_block() {
        assert!(parse_current(r#"{"cod": 401}"#, Units::Metric).is_err());
    }

    #[test]
    fn converts_imperial_and_kelvin_to_celsius() {
        let body = |temp: f64, feels: f64| {
            format!(r#"{{"main": {{"temp": {temp}, "feels_like": {feels}, "humidity": 40}}}}"#)
        };
        let r = parse_current(&body(86.0, 89.6), Units::Imperial).unwrap();
        assert_eq!(r.temperature, 30.0);
        assert_eq!(r.details.feels_like, Some(32.0));

        let r = parse_current(&body(293.15, 291.65), Units::Standard).unwrap();
        assert_eq!(r.temperature, 20.0);
        assert_eq!(r.details.feels_like, Some(18.5));

        assert_eq!(Units::parse("imperial"), Some(Units::Imperial));
        assert_eq!(Units::parse("kelvin"), None);
    }

    #[test]
    fn imperial_config_requests_imperial() {
        let mut cfg: config::Config = serde_yaml::from_str(config::example()).unwrap();
        cfg.weather.units = "imperial".into();
        let client = OpenWeatherClient::from_config(&cfg.weather).unwrap();
        let req = client.build_request().unwrap();
        assert!(req.url().query().unwrap().contains("units=imperial"));

        cfg.weather.units = "rankine".into();
        assert!(OpenWeatherClient::from_config(&cfg.weather).is_err());
    }

    #[test]
    fn request_carries_query() {
        let cfg: config::Config = serde_yaml::from_str(config::example()).unwrap();
        let client = OpenWeatherClient::from_config(&cfg.weather).unwrap();
        let req = client.build_request().unwrap();
        assert_eq!(req.url().path(), "/data/2.5/weather");
        let query = req.url().query().unwrap();
        assert!(query.contains("lat=48.85"));
        assert!(query.contains("units=metric"));
        assert!(query.contains("appid=YOUR_OPENWEATHERMAP_API_KEY"));
    }
}
