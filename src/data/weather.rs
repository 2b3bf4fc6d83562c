//! Open-Meteo weather API client
//!
//! This module fetches a one-day hourly temperature forecast from the Open-Meteo
//! API for planets listed in the static coordinates table, and parses it into
//! a `WeatherReport`.

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::planets::{coordinates_for, Coordinates};
use super::{fetch_json, HourlyTemperature, OriginError, WeatherReport};

/// Base URL for the Open-Meteo API
const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";

/// Timezone forecasts are reported in unless overridden
const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Client for fetching weather data from Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient with default settings
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    /// Point the client at a different Open-Meteo host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a new WeatherClient with a custom timezone
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Fetch the forecast for a planet by name
    ///
    /// # Returns
    /// * `Ok(Some(WeatherReport))` - The planet's hourly forecast
    /// * `Ok(None)` - The planet has no coordinates; no request is made
    /// * `Err(OriginError)` - If the request or parsing fails
    pub async fn fetch_weather(
        &self,
        planet_name: &str,
    ) -> Result<Option<WeatherReport>, OriginError> {
        let Some(coordinates) = coordinates_for(planet_name) else {
            debug!(planet = planet_name, "no coordinates for planet, weather unavailable");
            return Ok(None);
        };

        self.fetch_forecast(coordinates).await.map(Some)
    }

    /// Fetch a one-day hourly temperature forecast for the given coordinates
    pub async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherReport, OriginError> {
        let url = format!("{}/v1/forecast", self.base_url);
        info!(
            %url,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "fetching forecast from origin"
        );

        let request = self.client.get(&url).query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("hourly", "temperature_2m".to_string()),
            ("timezone", self.timezone.clone()),
            ("forecast_days", "1".to_string()),
        ]);

        let api_response: OpenMeteoResponse = fetch_json(request).await?;
        parse_response(api_response)
    }
}

/// Parse the Open-Meteo API response into a WeatherReport
fn parse_response(response: OpenMeteoResponse) -> Result<WeatherReport, OriginError> {
    let hourly = response
        .hourly
        .ok_or_else(|| OriginError::MissingField("hourly".to_string()))?;

    Ok(WeatherReport {
        latitude: response.latitude,
        longitude: response.longitude,
        timezone: response.timezone,
        hourly: parse_hourly_data(&hourly)?,
    })
}

/// Zip the parallel hourly arrays into HourlyTemperature values
fn parse_hourly_data(hourly: &HourlyWeather) -> Result<Vec<HourlyTemperature>, OriginError> {
    if hourly.temperature_2m.len() != hourly.time.len() {
        return Err(OriginError::MissingField(
            "hourly arrays have inconsistent lengths".to_string(),
        ));
    }

    hourly
        .time
        .iter()
        .zip(&hourly.temperature_2m)
        .map(|(time, temperature)| {
            Ok(HourlyTemperature {
                time: parse_datetime(time)?,
                temperature: *temperature,
            })
        })
        .collect()
}

/// Parse a datetime string in ISO 8601 format (e.g., "2024-07-15T05:30") to NaiveDateTime
fn parse_datetime(datetime_str: &str) -> Result<NaiveDateTime, OriginError> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M")
        .map_err(|_| OriginError::InvalidTimeFormat(datetime_str.to_string()))
}

/// Open-Meteo API response structure
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: String,
    hourly: Option<HourlyWeather>,
}

/// Hourly weather data from Open-Meteo
#[derive(Debug, Deserialize)]
struct HourlyWeather {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
}
