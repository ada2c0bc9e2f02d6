//! wttr.in client and `format=j1` envelope parsing.

use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use styleme_core::{ConfigError, ReqwestErrorExt, WeatherConfig};
use tracing::instrument;
use url::Url;

use crate::error::ProviderError;
use crate::types::{Coordinate, PrimaryCondition, WeatherReading};

const USER_AGENT: &str = concat!("styleme/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce a current-weather reading.
pub trait WeatherSource: Send + Sync {
    fn fetch_weather(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<WeatherReading, ProviderError>> + Send;

    fn fetch_weather_by_city(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<WeatherReading, ProviderError>> + Send;

    /// Checked once before any request is made.
    fn check_configuration(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Numeric envelope fields and the value used when one is missing or
/// does not parse.
///
/// | field            | default |
/// |------------------|---------|
/// | `pressure`       | 1013    |
/// | everything else  | 0       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Temperature,
    FeelsLike,
    Humidity,
    WindSpeed,
    WindDirection,
    WeatherCode,
    Pressure,
    MinTemperature,
    MaxTemperature,
}

impl NumericField {
    pub const fn default_value(self) -> f64 {
        match self {
            Self::Pressure => 1013.0,
            _ => 0.0,
        }
    }

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Temperature => "temp_C",
            Self::FeelsLike => "FeelsLikeC",
            Self::Humidity => "humidity",
            Self::WindSpeed => "windspeedKmph",
            Self::WindDirection => "winddirDegree",
            Self::WeatherCode => "weatherCode",
            Self::Pressure => "pressure",
            Self::MinTemperature => "mintempC",
            Self::MaxTemperature => "maxtempC",
        }
    }

    fn read(self, raw: Option<&str>) -> f64 {
        match raw.map(str::trim).and_then(|s| s.parse::<f64>().ok()) {
            Some(value) if value.is_finite() => value,
            _ => {
                tracing::debug!(
                    "Field {} missing or unparseable ({:?}), using {}",
                    self.wire_name(),
                    raw,
                    self.default_value()
                );
                self.default_value()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorData {
    #[serde(default)]
    error: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: Option<String>,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: Option<String>,
    humidity: Option<String>,
    #[serde(rename = "windspeedKmph")]
    windspeed_kmph: Option<String>,
    #[serde(rename = "winddirDegree")]
    winddir_degree: Option<String>,
    #[serde(rename = "winddir16Point", default)]
    winddir_16_point: String,
    #[serde(rename = "weatherCode")]
    weather_code: Option<String>,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<TextValue>,
    pressure: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearestArea {
    #[serde(rename = "areaName", default)]
    area_name: Vec<TextValue>,
    #[serde(default)]
    country: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct DailySummary {
    #[serde(rename = "mintempC")]
    min_temp_c: Option<String>,
    #[serde(rename = "maxtempC")]
    max_temp_c: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
    #[serde(default)]
    nearest_area: Vec<NearestArea>,
    #[serde(default)]
    weather: Vec<DailySummary>,
    data: Option<ErrorData>,
}

fn first_text(values: &[TextValue]) -> Option<&str> {
    values
        .first()
        .map(|v| v.value.trim())
        .filter(|v| !v.is_empty())
}

/// Parse a `format=j1` body into a reading.
///
/// `query` names the requested place and is used when the envelope has no
/// `nearest_area`. Unparseable numbers fall back to [`NumericField`]
/// defaults instead of failing.
pub fn parse_envelope(
    body: &str,
    query: &str,
    observed_at: DateTime<Utc>,
) -> Result<WeatherReading, ProviderError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(data) = &envelope.data {
        if let Some(err) = data.error.first() {
            return Err(ProviderError::Embedded(err.msg.clone()));
        }
    }

    let current = envelope
        .current_condition
        .first()
        .ok_or(ProviderError::MissingCurrentCondition)?;

    let area = envelope.nearest_area.first();
    let location_name = area
        .and_then(|a| first_text(&a.area_name))
        .unwrap_or(query)
        .to_string();
    let country = area
        .and_then(|a| first_text(&a.country))
        .map(str::to_string);

    let today = envelope.weather.first();
    let temperature = NumericField::Temperature.read(current.temp_c.as_deref());
    let temp_min = NumericField::MinTemperature.read(today.and_then(|d| d.min_temp_c.as_deref()));
    let temp_max = NumericField::MaxTemperature.read(today.and_then(|d| d.max_temp_c.as_deref()));

    let code = NumericField::WeatherCode.read(current.weather_code.as_deref());
    let code = if (0.0..=f64::from(u16::MAX)).contains(&code) {
        code as u16
    } else {
        0
    };
    let description = first_text(&current.weather_desc).unwrap_or_default();

    let humidity = NumericField::Humidity
        .read(current.humidity.as_deref())
        .clamp(0.0, 100.0)
        .round() as u8;
    let wind_direction_degrees = NumericField::WindDirection
        .read(current.winddir_degree.as_deref())
        .rem_euclid(360.0) as u16;

    let reading = WeatherReading {
        location_name,
        country,
        temperature,
        feels_like: NumericField::FeelsLike.read(current.feels_like_c.as_deref()),
        humidity,
        temp_min,
        temp_max,
        wind_speed_kmh: NumericField::WindSpeed.read(current.windspeed_kmph.as_deref()),
        wind_direction_degrees,
        wind_direction: current.winddir_16_point.trim().to_string(),
        pressure_hpa: NumericField::Pressure.read(current.pressure.as_deref()),
        condition: PrimaryCondition::from_code(code, description),
        observed_at,
    };

    Ok(reading.sanitized())
}

/// wttr.in weather provider.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: Url,
    config: WeatherConfig,
}

impl WeatherProvider {
    /// Requests carry no timeout of their own.
    pub fn new(config: &WeatherConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    fn request_url(&self, location: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(location);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "j1");
            if let Ok(Some(key)) = self.config.credentials() {
                query.append_pair("key", key);
            }
            if let Some(lang) = self.config.language.as_deref().filter(|l| !l.is_empty()) {
                query.append_pair("lang", lang);
            }
        }

        Ok(url)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, location: &str) -> Result<WeatherReading, ProviderError> {
        let url = self.request_url(location)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.into_network_error()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.into_network_error()))?;

        if !status.is_success() {
            let message: String = body.chars().take(200).collect();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reading = parse_envelope(&body, location, Utc::now())?;
        tracing::debug!(
            location = %reading.location_name,
            temperature = reading.temperature,
            condition = reading.condition.kind.description(),
            "Weather fetched"
        );
        Ok(reading)
    }
}

impl WeatherSource for WeatherProvider {
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherReading, ProviderError> {
        self.fetch(&coordinate.to_string()).await
    }

    async fn fetch_weather_by_city(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        self.fetch(city).await
    }

    fn check_configuration(&self) -> Result<(), ConfigError> {
        self.config.credentials().map(|_| ())
    }
}
