use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
///
/// Every location provider normalizes into this one shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Request object handed to the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinates> for WeatherQuery {
    fn from(coords: Coordinates) -> Self {
        Self {
            lat: coords.latitude,
            lng: coords.longitude,
        }
    }
}

/// Which weather API feature to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Conditions,
    Forecast,
}

impl Feature {
    /// Path segment used in the request URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conditions => "conditions",
            Self::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw barometric trend code as reported by the API.
///
/// `"0"` means steady; anything else (normally `"+"` or `"-"`) is shown
/// verbatim in front of the pressure value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressureTrend(pub String);

impl PressureTrend {
    pub const STEADY: &'static str = "0";

    /// Prefix to print before the pressure reading
    pub fn sign(&self) -> &str {
        if self.0 == Self::STEADY {
            ""
        } else {
            &self.0
        }
    }
}

/// Current weather conditions.
///
/// Values are kept as the text the API sent so they render unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentObservation {
    /// Full display name of the observed location, e.g. "San Francisco, CA"
    pub location_name: String,
    /// Human readable observation time ("Last Updated on ...")
    pub observation_time: String,
    /// Temperature in the configured unit
    pub temperature: String,
    pub feels_like: String,
    pub condition: String,
    pub relative_humidity: String,
    pub visibility_mi: String,
    pub uv: String,
    pub wind_mph: String,
    pub wind_dir: String,
    /// Sentence describing the wind ("From the NW at 5 MPH")
    pub wind_description: String,
    pub pressure_in: String,
    pub pressure_trend: PressureTrend,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: u32,
    pub month_short: String,
    pub high: String,
    pub low: String,
    pub condition: String,
    pub avg_humidity: String,
    pub avg_wind_mph: String,
    pub precip_in: String,
}

impl ForecastDay {
    /// Label such as "Oct 18"
    pub fn date_label(&self) -> String {
        format!("{} {}", self.month_short, self.day)
    }
}

/// Both weather responses for one location, fetched together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub coordinates: Coordinates,
    pub current: CurrentObservation,
    /// Days in API order; the first entry is today
    pub forecast: Vec<ForecastDay>,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_coordinates() {
        let query = WeatherQuery::from(Coordinates::new(40.0, -73.0));
        assert_eq!(query, WeatherQuery { lat: 40.0, lng: -73.0 });
    }

    #[test]
    fn test_feature_path_segment() {
        assert_eq!(Feature::Conditions.as_str(), "conditions");
        assert_eq!(Feature::Forecast.to_string(), "forecast");
    }

    #[test]
    fn test_steady_trend_has_no_sign() {
        assert_eq!(PressureTrend("0".into()).sign(), "");
    }

    #[test]
    fn test_trend_sign_is_verbatim() {
        assert_eq!(PressureTrend("+".into()).sign(), "+");
        assert_eq!(PressureTrend("-".into()).sign(), "-");
    }

    #[test]
    fn test_date_label() {
        let day = ForecastDay {
            day: 18,
            month_short: "Oct".into(),
            high: "68".into(),
            low: "52".into(),
            condition: "Clear".into(),
            avg_humidity: "60".into(),
            avg_wind_mph: "5".into(),
            precip_in: "0.00".into(),
        };
        assert_eq!(day.date_label(), "Oct 18");
    }
}
