use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(LocationError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// How a reading's location was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Host location sensor
    Precise,
    /// IP geolocation
    Approximate,
    /// Configured fallback city
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precise => "precise",
            Self::Approximate => "approximate",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate plus how it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub provenance: Provenance,
}

/// Weather condition categories mapped from WWO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Convert a World Weather Online condition code (as served by wttr.in)
    pub fn from_wwo_code(code: u16) -> Self {
        match code {
            113 => Self::Clear,
            116 => Self::PartlyCloudy,
            119 | 122 => Self::Cloudy,
            143 | 248 | 260 => Self::Fog,
            263 | 266 => Self::Drizzle,
            176 | 293 | 296 | 299 | 302 | 353 => Self::Rain,
            305 | 308 | 356 | 359 => Self::HeavyRain,
            179 | 227 | 230 | 323 | 326 | 329 | 332 | 335 | 338 | 368 | 371 => Self::Snow,
            182 | 185 | 281 | 284 | 311 | 314 | 317 | 320 | 350 | 362 | 365 | 374 | 377 => {
                Self::Sleet
            }
            200 | 386 | 389 | 392 | 395 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy | Self::Unknown => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// The condition block shown with a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryCondition {
    pub kind: WeatherCondition,
    /// Provider wording, e.g. "Light snow"
    pub description: String,
    pub icon: String,
}

impl PrimaryCondition {
    pub fn from_code(code: u16, description: impl Into<String>) -> Self {
        let kind = WeatherCondition::from_wwo_code(code);
        Self {
            kind,
            description: description.into(),
            icon: kind.icon_name().to_string(),
        }
    }

    /// Lowercased tag and provider wording, for keyword matching.
    pub fn keyword_text(&self) -> String {
        format!("{} {}", self.kind.description(), self.description).to_lowercase()
    }
}

/// Snapshot of current weather at a location.
///
/// Temperatures are finite degrees Celsius, humidity is a 0-100 percentage
/// and wind speed is non-negative km/h. [`WeatherReading::sanitized`]
/// enforces these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location_name: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_degrees: u16,
    /// 16-point compass, e.g. "NNW"
    pub wind_direction: String,
    pub pressure_hpa: f64,
    pub condition: PrimaryCondition,
    pub observed_at: DateTime<Utc>,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl WeatherReading {
    /// Clamp out-of-range values so the type invariants hold.
    pub fn sanitized(mut self) -> Self {
        self.temperature = finite_or_zero(self.temperature);
        self.feels_like = finite_or_zero(self.feels_like);
        self.temp_min = finite_or_zero(self.temp_min);
        self.temp_max = finite_or_zero(self.temp_max);
        self.humidity = self.humidity.min(100);
        self.wind_speed_kmh = finite_or_zero(self.wind_speed_kmh).max(0.0);
        self.wind_direction_degrees %= 360;
        self
    }

    pub fn display_location(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() && country != self.location_name => {
                format!("{}, {}", self.location_name, country)
            }
            _ => self.location_name.clone(),
        }
    }

    pub fn display_temperature(&self) -> String {
        format!("{}°C", round_degrees(self.temperature))
    }

    pub fn display_feels_like(&self) -> String {
        format!("Feels {}°", round_degrees(self.feels_like))
    }

    pub fn display_range(&self) -> String {
        format!(
            "{}° / {}°",
            round_degrees(self.temp_min),
            round_degrees(self.temp_max)
        )
    }

    pub fn display_humidity(&self) -> String {
        format!("{}%", self.humidity)
    }

    pub fn display_wind(&self) -> String {
        let speed = self.wind_speed_kmh.round() as i64;
        if self.wind_direction.is_empty() {
            format!("{speed} km/h")
        } else {
            format!("{speed} km/h {}", self.wind_direction)
        }
    }
}

fn round_degrees(value: f64) -> i64 {
    value.round() as i64
}

/// A reading together with how its location was found.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedReading {
    pub reading: WeatherReading,
    pub provenance: Provenance,
}

#[cfg(test)]
pub(crate) fn sample_reading(temperature: f64, code: u16, description: &str) -> WeatherReading {
    WeatherReading {
        location_name: "London".to_string(),
        country: Some("United Kingdom".to_string()),
        temperature,
        feels_like: temperature - 2.0,
        humidity: 70,
        temp_min: temperature - 3.0,
        temp_max: temperature + 3.0,
        wind_speed_kmh: 11.0,
        wind_direction_degrees: 230,
        wind_direction: "SW".to_string(),
        pressure_hpa: 1012.0,
        condition: PrimaryCondition::from_code(code, description),
        observed_at: Utc::now(),
    }
}
