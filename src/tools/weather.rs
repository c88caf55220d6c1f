//! Current-weather lookup backed by Open-Meteo.
//!
//! Two sequential calls: geocoding resolves the place name to coordinates,
//! then the forecast API returns current conditions for those coordinates.
//! Only "no such place" and "forecast unavailable" are turned into text for the
//! model; any other failure (transport errors, unexpected JSON) is returned as
//! an error.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Number, Value};

use super::Tool;
use crate::config::WeatherConfig;

/// Variables requested from the forecast API's `current` block.
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,precipitation,weather_code";

pub const FORECAST_UNAVAILABLE: &str = "Error fetching weather data";

/// A place name resolved to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions at a point.
///
/// Measurements stay as JSON numbers so they print exactly as the forecast
/// service wrote them (`21.0` stays `21.0`, `60` stays `60`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherReading {
    #[serde(rename = "temperature_2m")]
    pub temperature: Number,
    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: Number,
    pub precipitation: Number,
    /// Absent from the response means code 0; `null` is kept as `null`.
    #[serde(default = "clear_sky_code")]
    pub weather_code: Value,
}

fn clear_sky_code() -> Value {
    Value::from(0)
}

impl WeatherReading {
    /// Label for the reported code. `null`, strings and fractional codes are `Unknown`.
    pub fn condition(&self) -> &'static str {
        match integral_code(&self.weather_code) {
            Some(code) => weather_code_label(code),
            None => "Unknown",
        }
    }
}

/// Integer value of a code, accepting integral floats such as `2.0`.
fn integral_code(value: &Value) -> Option<i64> {
    if let Some(code) = value.as_i64() {
        return Some(code);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
        .map(|f| f as i64)
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingMatch>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: WeatherReading,
}

/// Map a WMO weather code to a label. The table is deliberately partial.
pub fn weather_code_label(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        51 => "Light drizzle",
        61 => "Slight rain",
        71 => "Slight snow",
        _ => "Unknown",
    }
}

/// Render the four-line summary handed back to the model.
pub fn format_report(location: &str, reading: &WeatherReading) -> String {
    format!(
        "Current weather in {}:\nTemperature: {}°C\nHumidity: {}%\nPrecipitation: {} mm\nCondition: {}",
        location,
        reading.temperature,
        reading.relative_humidity,
        reading.precipitation,
        reading.condition()
    )
}

/// HTTP client for the geocoding and forecast endpoints.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new(&WeatherConfig::default())
    }
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
        }
    }

    /// Look up current weather for a place name and format it as text.
    pub async fn current_weather(&self, location: &str) -> anyhow::Result<String> {
        let Some(geo) = self.geocode(location).await? else {
            tracing::info!(location, "Location not found");
            return Ok(format!("Could not find location: {}", location));
        };

        let Some(reading) = self.current_conditions(&geo).await? else {
            tracing::warn!(location, "Forecast service returned a non-200 status");
            return Ok(FORECAST_UNAVAILABLE.to_string());
        };

        Ok(format_report(location, &reading))
    }

    /// Resolve a place name to its best match. `None` when the service has no match
    /// or does not answer with 200.
    pub async fn geocode(&self, location: &str) -> anyhow::Result<Option<GeoResult>> {
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .await
            .context("Geocoding request failed")?;

        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        let first = body.results.and_then(|r| r.into_iter().next());
        Ok(first.map(|m| {
            tracing::debug!(
                "Geocoded {} to ({:.4}, {:.4})",
                location,
                m.latitude,
                m.longitude
            );
            GeoResult {
                name: location.to_string(),
                latitude: m.latitude,
                longitude: m.longitude,
            }
        }))
    }

    /// Fetch current conditions. `None` when the forecast service does not answer with 200.
    pub async fn current_conditions(&self, geo: &GeoResult) -> anyhow::Result<Option<WeatherReading>> {
        tracing::debug!(
            "Fetching current conditions for {} ({:.4}, {:.4})",
            geo.name,
            geo.latitude,
            geo.longitude
        );

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", geo.latitude.to_string()),
                ("longitude", geo.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await
            .context("Forecast request failed")?;

        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        let body: ForecastResponse = response
            .json()
            .await
            .context("Failed to parse forecast response")?;

        Ok(Some(body.current))
    }
}

/// The `get_current_weather` tool.
pub struct GetCurrentWeather {
    client: WeatherClient,
}

impl GetCurrentWeather {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetCurrentWeather {
    fn name(&self) -> &str {
        "get_current_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a given location (city name)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name to look up"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let location = args["location"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'location' argument"))?;

        tracing::info!("Looking up current weather for {}", location);
        self.client.current_weather(location).await
    }
}
