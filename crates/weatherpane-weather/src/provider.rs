//! Weather API client.
//!
//! Requests look like `{base_url}/{api_key}/{feature}/q/{lat},{lng}.json`.
//! Current conditions and the forecast are fetched concurrently and decoded
//! into typed records; a failure in either one fails the whole report.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use weatherpane_core::{NetworkError, ReqwestErrorExt, TemperatureUnit, WeatherConfig, WeatherError};

use crate::types::{
    Coordinates, CurrentObservation, Feature, ForecastDay, PressureTrend, WeatherQuery,
    WeatherReport,
};

/// Error type the API reports for a missing or revoked key
const KEY_NOT_FOUND: &str = "keynotfound";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    unit: TemperatureUnit,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            unit: config.temperature_unit,
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Build the request URL for one feature
    pub fn url(&self, query: &WeatherQuery, feature: Feature) -> String {
        format!(
            "{}/{}/{}/q/{},{}.json",
            self.base_url, self.api_key, feature, query.lat, query.lng
        )
    }

    /// Fetch one feature and return the raw JSON body.
    ///
    /// Non-success statuses and API-level error objects become named errors.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(
        &self,
        query: &WeatherQuery,
        feature: Feature,
    ) -> Result<serde_json::Value, WeatherError> {
        let url = self.url(query, feature);
        tracing::debug!("Requesting {} for {},{}", feature, query.lat, query.lng);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned {} for {}", status, feature);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

        check_api_error(&body)?;
        Ok(body)
    }

    /// Fetch and decode current conditions
    pub async fn fetch_conditions(
        &self,
        query: &WeatherQuery,
    ) -> Result<CurrentObservation, WeatherError> {
        let body = self.fetch(query, Feature::Conditions).await?;
        let response: wire::ConditionsResponse = decode(body)?;
        response.current_observation.into_observation(self.unit)
    }

    /// Fetch and decode the forecast days, today first
    pub async fn fetch_forecast(&self, query: &WeatherQuery) -> Result<Vec<ForecastDay>, WeatherError> {
        let body = self.fetch(query, Feature::Forecast).await?;
        let response: wire::ForecastResponse = decode(body)?;
        response
            .forecast
            .simpleforecast
            .forecastday
            .into_iter()
            .map(|day| day.into_forecast_day(self.unit))
            .collect()
    }

    /// Fetch conditions and forecast concurrently and wait for both.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_report(&self, coordinates: Coordinates) -> Result<WeatherReport, WeatherError> {
        let query = WeatherQuery::from(coordinates);

        let (current, forecast) =
            tokio::try_join!(self.fetch_conditions(&query), self.fetch_forecast(&query))?;

        tracing::info!(
            "Fetched weather for {} with {} forecast days",
            current.location_name,
            forecast.len()
        );

        Ok(WeatherReport {
            coordinates,
            current,
            forecast,
            fetched_at: Utc::now(),
        })
    }
}

/// Turn an API-level `response.error` object into a named error
fn check_api_error(body: &serde_json::Value) -> Result<(), WeatherError> {
    let Some(error) = body.pointer("/response/error") else {
        return Ok(());
    };

    let kind = error
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let description = error
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    tracing::warn!("Weather API reported error {}: {}", kind, description);

    if kind == KEY_NOT_FOUND {
        Err(WeatherError::InvalidApiKey)
    } else {
        Err(WeatherError::Api { kind, description })
    }
}

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, WeatherError> {
    serde_json::from_value(body).map_err(|e| WeatherError::MalformedResponse(e.to_string()))
}

/// Wire format of the weather API.
mod wire {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use weatherpane_core::{TemperatureUnit, WeatherError};

    use super::{CurrentObservation, ForecastDay, PressureTrend};

    /// The API sends many values as either strings or numbers.
    fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    fn pick(
        unit: TemperatureUnit,
        fahrenheit: Option<String>,
        celsius: Option<String>,
        field: &str,
    ) -> Result<String, WeatherError> {
        let (value, suffix) = match unit {
            TemperatureUnit::Fahrenheit => (fahrenheit, "f"),
            TemperatureUnit::Celsius => (celsius, "c"),
        };
        value.ok_or_else(|| WeatherError::MalformedResponse(format!("missing field `{field}_{suffix}`")))
    }

    #[derive(Debug, Deserialize)]
    pub struct ConditionsResponse {
        pub current_observation: RawObservation,
    }

    #[derive(Debug, Deserialize)]
    pub struct DisplayLocation {
        pub full: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawObservation {
        #[serde(rename = "UV", deserialize_with = "text")]
        pub uv: String,
        #[serde(default, deserialize_with = "opt_text")]
        pub temp_f: Option<String>,
        #[serde(default, deserialize_with = "opt_text")]
        pub temp_c: Option<String>,
        #[serde(default, deserialize_with = "opt_text")]
        pub feelslike_f: Option<String>,
        #[serde(default, deserialize_with = "opt_text")]
        pub feelslike_c: Option<String>,
        #[serde(deserialize_with = "text")]
        pub relative_humidity: String,
        #[serde(deserialize_with = "text")]
        pub visibility_mi: String,
        pub observation_time: String,
        #[serde(deserialize_with = "text")]
        pub pressure_in: String,
        #[serde(deserialize_with = "text")]
        pub pressure_trend: String,
        pub display_location: DisplayLocation,
        pub weather: String,
        #[serde(deserialize_with = "text")]
        pub wind_mph: String,
        pub wind_dir: String,
        pub wind_string: String,
    }

    impl RawObservation {
        pub fn into_observation(
            self,
            unit: TemperatureUnit,
        ) -> Result<CurrentObservation, WeatherError> {
            Ok(CurrentObservation {
                temperature: pick(unit, self.temp_f, self.temp_c, "temp")?,
                feels_like: pick(unit, self.feelslike_f, self.feelslike_c, "feelslike")?,
                location_name: self.display_location.full,
                observation_time: self.observation_time,
                condition: self.weather,
                relative_humidity: self.relative_humidity,
                visibility_mi: self.visibility_mi,
                uv: self.uv,
                wind_mph: self.wind_mph,
                wind_dir: self.wind_dir,
                wind_description: self.wind_string,
                pressure_in: self.pressure_in,
                pressure_trend: PressureTrend(self.pressure_trend),
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub forecast: Forecast,
    }

    #[derive(Debug, Deserialize)]
    pub struct Forecast {
        pub simpleforecast: SimpleForecast,
    }

    #[derive(Debug, Deserialize)]
    pub struct SimpleForecast {
        pub forecastday: Vec<RawForecastDay>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawDate {
        pub day: u32,
        pub monthname_short: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawTemperature {
        #[serde(default, deserialize_with = "opt_text")]
        pub fahrenheit: Option<String>,
        #[serde(default, deserialize_with = "opt_text")]
        pub celsius: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawWind {
        #[serde(deserialize_with = "text")]
        pub mph: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawPrecipitation {
        #[serde(rename = "in", deserialize_with = "text")]
        pub inches: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawForecastDay {
        pub date: RawDate,
        pub high: RawTemperature,
        pub low: RawTemperature,
        pub conditions: String,
        #[serde(deserialize_with = "text")]
        pub avehumidity: String,
        pub avewind: RawWind,
        pub qpf_allday: RawPrecipitation,
    }

    impl RawForecastDay {
        pub fn into_forecast_day(self, unit: TemperatureUnit) -> Result<ForecastDay, WeatherError> {
            let (high, low) = match unit {
                TemperatureUnit::Fahrenheit => (self.high.fahrenheit, self.low.fahrenheit),
                TemperatureUnit::Celsius => (self.high.celsius, self.low.celsius),
            };
            let missing = |field: &str| {
                WeatherError::MalformedResponse(format!("missing forecast {field} for {}", unit.symbol()))
            };

            Ok(ForecastDay {
                day: self.date.day,
                month_short: self.date.monthname_short,
                high: high.ok_or_else(|| missing("high"))?,
                low: low.ok_or_else(|| missing("low"))?,
                condition: self.conditions,
                avg_humidity: self.avehumidity,
                avg_wind_mph: self.avewind.mph,
                precip_in: self.qpf_allday.inches,
            })
        }
    }
}
