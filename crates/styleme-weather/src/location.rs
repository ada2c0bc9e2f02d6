//! Location resolution: host sensor first, IP geolocation second.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use styleme_core::{LocationConfig, ReqwestErrorExt};
use tokio::time::Instant;
use tracing::instrument;

use crate::error::LocationError;
use crate::types::Coordinate;

/// Options passed to the host location sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A previous fix younger than this may be reused.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(300),
        }
    }
}

impl From<&LocationConfig> for PositionOptions {
    fn from(config: &LocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: config.sensor_timeout(),
            maximum_age: config.max_position_age(),
        }
    }
}

/// A device-level position source.
pub trait LocationSensor: Send + Sync {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Coarse position from the public IP address.
pub trait IpLocator: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Host sensor backed by configuration.
///
/// A terminal process has no positioning hardware, so the "sensor" is a
/// fixed coordinate from `[location]` or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostSensor {
    Fixed(Coordinate),
    Unavailable,
}

impl HostSensor {
    pub fn from_config(config: &LocationConfig) -> Self {
        match config.fixed_position() {
            Some((lat, lon)) => match Coordinate::new(lat, lon) {
                Ok(coordinate) => Self::Fixed(coordinate),
                Err(e) => {
                    tracing::warn!("Ignoring configured position: {}", e);
                    Self::Unavailable
                }
            },
            None => Self::Unavailable,
        }
    }
}

impl LocationSensor for HostSensor {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        match self {
            Self::Fixed(coordinate) => Ok(*coordinate),
            Self::Unavailable => Err(LocationError::ServiceUnavailable),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_code: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// ipapi.co `/json/` client.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    client: Client,
    url: String,
}

impl IpApiLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        Self::new(config.ip_lookup_url.clone())
    }
}

impl IpLocator for IpApiLocator {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn locate(&self) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Lookup(e.into_network_error().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Lookup(format!("HTTP {}", status.as_u16())));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Lookup(format!("JSON parse error: {}", e)))?;

        if body.error {
            return Err(LocationError::Lookup(
                body.reason.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let (Some(latitude), Some(longitude)) = (body.latitude, body.longitude) else {
            return Err(LocationError::Lookup("response has no coordinates".into()));
        };

        let coordinate = Coordinate::new(latitude, longitude)?;
        tracing::debug!(
            city = body.city.as_deref().unwrap_or("?"),
            country = body.country_code.as_deref().unwrap_or("?"),
            "IP location resolved"
        );
        Ok(coordinate)
    }
}

/// Sensor-then-IP location resolution with a cached precise fix.
pub struct LocationResolver<S, I> {
    sensor: S,
    locator: I,
    options: PositionOptions,
    last_fix: Mutex<Option<(Coordinate, Instant)>>,
}

impl<S: LocationSensor, I: IpLocator> LocationResolver<S, I> {
    pub fn new(sensor: S, locator: I, options: PositionOptions) -> Self {
        Self {
            sensor,
            locator,
            options,
            last_fix: Mutex::new(None),
        }
    }

    fn cached_fix(&self) -> Option<Coordinate> {
        let guard = self.last_fix.lock();
        match *guard {
            Some((coordinate, at)) if at.elapsed() < self.options.maximum_age => Some(coordinate),
            _ => None,
        }
    }

    /// Query the host sensor, bounded by the configured timeout.
    pub async fn precise(&self) -> Result<Coordinate, LocationError> {
        if let Some(coordinate) = self.cached_fix() {
            tracing::debug!("Reusing cached position fix");
            return Ok(coordinate);
        }

        let coordinate = tokio::time::timeout(
            self.options.timeout,
            self.sensor.current_position(&self.options),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        *self.last_fix.lock() = Some((coordinate, Instant::now()));
        Ok(coordinate)
    }

    /// Coarse position from the IP locator.
    pub async fn approximate(&self) -> Result<Coordinate, LocationError> {
        self.locator.locate().await
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Sensor returning a fixed result, counting calls.
    #[derive(Clone)]
    pub struct FakeSensor {
        pub result: Result<Coordinate, LocationError>,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeSensor {
        pub fn ok(lat: f64, lon: f64) -> Self {
            Self {
                result: Coordinate::new(lat, lon),
                delay: None,
                calls: Arc::default(),
            }
        }

        pub fn failing(err: LocationError) -> Self {
            Self {
                result: Err(err),
                delay: None,
                calls: Arc::default(),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LocationSensor for FakeSensor {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone()
        }
    }

    #[derive(Clone)]
    pub struct FakeLocator {
        pub result: Result<Coordinate, LocationError>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeLocator {
        pub fn ok(lat: f64, lon: f64) -> Self {
            Self {
                result: Coordinate::new(lat, lon),
                calls: Arc::default(),
            }
        }

        pub fn failing(reason: &str) -> Self {
            Self {
                result: Err(LocationError::Lookup(reason.to_string())),
                calls: Arc::default(),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl IpLocator for FakeLocator {
        async fn locate(&self) -> Result<Coordinate, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }
}
