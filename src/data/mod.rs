//! Core data models for holocast
//!
//! This module contains the normalized records returned by the origin clients
//! and the composite record the aggregator assembles from them.

pub mod planets;
pub mod swapi;
pub mod weather;

pub use planets::{coordinates_for, Coordinates};
pub use swapi::SwapiClient;
pub use weather::WeatherClient;

use chrono::NaiveDateTime;
use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur when calling an origin API
#[derive(Debug, Error)]
pub enum OriginError {
    /// The origin answered with a non-2xx status
    #[error("{url} responded with HTTP {status}")]
    Status { status: u16, url: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Invalid time format in response
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
}

impl OriginError {
    /// Whether the origin reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, OriginError::Status { status: 404, .. })
    }
}

/// Sends `request` and decodes a 2xx JSON body
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, OriginError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(OriginError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// A character from the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Registry identifier
    pub id: String,
    pub name: String,
    /// Absolute URL of the character's homeworld, empty if the registry has none
    pub homeworld: String,
    /// Canonical registry URL of the character
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Every other registry property, untouched
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// A planet from the registry, identified by the URL it was fetched from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub url: String,
    pub name: String,
    pub climate: String,
    #[serde(default)]
    pub description: String,
    /// Every other registry property, untouched
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Forecast temperature for a single hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTemperature {
    /// Local time of the forecast, in the report's timezone
    pub time: NaiveDateTime,
    /// Temperature at 2m in Celsius
    pub temperature: f64,
}

/// One-day hourly temperature forecast for a planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Grid latitude the forecast was computed for
    pub latitude: f64,
    /// Grid longitude the forecast was computed for
    pub longitude: f64,
    pub timezone: String,
    /// Forecasts ordered by time
    pub hourly: Vec<HourlyTemperature>,
}

/// A planet together with its weather, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetWithWeather {
    pub data: Planet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherReport>,
}

/// A character merged with its homeworld and the homeworld's weather
///
/// Built fresh for every request and never cached itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    #[serde(flatten)]
    pub character: Character,
    pub planet: PlanetWithWeather,
}
