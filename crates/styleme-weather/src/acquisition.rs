//! Weather acquisition state machine.
//!
//! The transition function is pure; [`WeatherAcquisition`] drives it by
//! performing the I/O each state asks for and feeding the outcome back as an
//! event. A run ends in `Succeeded` or `Failed`. Manual retry starts a new
//! run from `Init`.

use styleme_core::{Config, ConfigError};
use tracing::instrument;

use crate::error::{AcquisitionError, AttemptError, LocationError, ProviderError};
use crate::location::{
    HostSensor, IpApiLocator, IpLocator, LocationResolver, LocationSensor, PositionOptions,
};
use crate::provider::{WeatherProvider, WeatherSource};
use crate::types::{Coordinate, Provenance, ResolvedLocation, SourcedReading, WeatherReading};

#[derive(Debug, Clone)]
pub enum AcquisitionState {
    Init,
    ResolvingPrecise,
    /// Carries the sensor failure so it can be reported if the lookup fails too.
    ResolvingApproximate { sensor: LocationError },
    Fetching(ResolvedLocation),
    Fallback { city: String, cause: AttemptError },
    Succeeded(SourcedReading),
    Failed(AcquisitionError),
}

#[derive(Debug, Clone)]
pub enum AcquisitionEvent {
    Start,
    ConfigurationRejected(ConfigError),
    PreciseResolved(Coordinate),
    SensorFailed(LocationError),
    ApproximateResolved(Coordinate),
    LookupFailed(LocationError),
    Fetched(WeatherReading),
    FetchFailed(ProviderError),
    Reset,
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ResolvingPrecise => "resolving_precise",
            Self::ResolvingApproximate { .. } => "resolving_approximate",
            Self::Fetching(_) => "fetching",
            Self::Fallback { .. } => "fallback",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }

    /// Apply `event`. Events that do not fit the current state leave it
    /// unchanged; only `Reset` leaves a terminal state.
    pub fn next(self, event: AcquisitionEvent, fallback_city: &str) -> Self {
        use AcquisitionEvent as E;
        use AcquisitionState as S;

        match (self, event) {
            (_, E::Reset) => S::Init,

            (S::Init, E::Start) => S::ResolvingPrecise,
            (S::Init, E::ConfigurationRejected(e)) => {
                S::Failed(AcquisitionError::Configuration(e))
            }

            (S::ResolvingPrecise, E::PreciseResolved(coordinate)) => S::Fetching(ResolvedLocation {
                coordinate,
                provenance: Provenance::Precise,
            }),
            (S::ResolvingPrecise, E::SensorFailed(sensor)) => S::ResolvingApproximate { sensor },

            (S::ResolvingApproximate { .. }, E::ApproximateResolved(coordinate)) => {
                S::Fetching(ResolvedLocation {
                    coordinate,
                    provenance: Provenance::Approximate,
                })
            }
            (S::ResolvingApproximate { sensor }, E::LookupFailed(lookup)) => S::Fallback {
                city: fallback_city.to_string(),
                cause: AttemptError::Location(LocationError::Unavailable {
                    sensor: sensor.to_string(),
                    lookup: lookup.to_string(),
                }),
            },

            (S::Fetching(location), E::Fetched(reading)) => S::Succeeded(SourcedReading {
                reading,
                provenance: location.provenance,
            }),
            (S::Fetching(_), E::FetchFailed(e)) => S::Fallback {
                city: fallback_city.to_string(),
                cause: AttemptError::Provider(e),
            },

            (S::Fallback { .. }, E::Fetched(reading)) => S::Succeeded(SourcedReading {
                reading,
                provenance: Provenance::Fallback,
            }),
            (S::Fallback { city, cause }, E::FetchFailed(fallback)) => {
                S::Failed(AcquisitionError::Exhausted {
                    city,
                    primary: cause,
                    fallback,
                })
            }

            (state, _) => state,
        }
    }
}

/// Drives [`AcquisitionState`] against real (or fake) collaborators.
pub struct WeatherAcquisition<S, I, W> {
    resolver: LocationResolver<S, I>,
    source: W,
    fallback_city: String,
}

impl WeatherAcquisition<HostSensor, IpApiLocator, WeatherProvider> {
    /// Wire up the configured sensor, IP locator and wttr.in provider.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let resolver = LocationResolver::new(
            HostSensor::from_config(&config.location),
            IpApiLocator::from_config(&config.location),
            PositionOptions::from(&config.location),
        );
        let source = WeatherProvider::new(&config.weather)?;
        Ok(Self::new(resolver, source, config.weather.fallback_city.clone()))
    }
}

impl<S, I, W> WeatherAcquisition<S, I, W>
where
    S: LocationSensor,
    I: IpLocator,
    W: WeatherSource,
{
    pub fn new(
        resolver: LocationResolver<S, I>,
        source: W,
        fallback_city: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            source,
            fallback_city: fallback_city.into(),
        }
    }

    /// Perform the I/O the state calls for. Only valid for non-terminal states.
    async fn step(&self, state: &AcquisitionState) -> AcquisitionEvent {
        match state {
            AcquisitionState::Init => match self.source.check_configuration() {
                Ok(()) => AcquisitionEvent::Start,
                Err(e) => AcquisitionEvent::ConfigurationRejected(e),
            },
            AcquisitionState::ResolvingPrecise => match self.resolver.precise().await {
                Ok(c) => AcquisitionEvent::PreciseResolved(c),
                Err(e) => AcquisitionEvent::SensorFailed(e),
            },
            AcquisitionState::ResolvingApproximate { .. } => match self.resolver.approximate().await {
                Ok(c) => AcquisitionEvent::ApproximateResolved(c),
                Err(e) => AcquisitionEvent::LookupFailed(e),
            },
            AcquisitionState::Fetching(location) => {
                match self.source.fetch_weather(location.coordinate).await {
                    Ok(r) => AcquisitionEvent::Fetched(r),
                    Err(e) => AcquisitionEvent::FetchFailed(e),
                }
            }
            AcquisitionState::Fallback { city, .. } => {
                match self.source.fetch_weather_by_city(city).await {
                    Ok(r) => AcquisitionEvent::Fetched(r),
                    Err(e) => AcquisitionEvent::FetchFailed(e),
                }
            }
            AcquisitionState::Succeeded(_) | AcquisitionState::Failed(_) => {
                AcquisitionEvent::Reset
            }
        }
    }

    /// Run one acquisition from `Init` to a terminal state.
    #[instrument(skip(self), fields(fallback_city = %self.fallback_city), level = "info")]
    pub async fn acquire(&self) -> Result<SourcedReading, AcquisitionError> {
        let mut state = AcquisitionState::Init;

        loop {
            state = match state {
                AcquisitionState::Succeeded(sourced) => {
                    tracing::info!(
                        provenance = %sourced.provenance,
                        location = %sourced.reading.location_name,
                        "Weather acquired"
                    );
                    return Ok(sourced);
                }
                AcquisitionState::Failed(err) => {
                    tracing::error!("Weather acquisition failed: {}", err);
                    return Err(err);
                }
                current => {
                    let event = self.step(&current).await;
                    let from = current.name();
                    let next = current.next(event, &self.fallback_city);
                    match &next {
                        AcquisitionState::ResolvingApproximate { sensor } => {
                            tracing::warn!("Location sensor failed ({}), trying IP lookup", sensor);
                        }
                        AcquisitionState::Fallback { city, cause } => {
                            tracing::warn!(
                                "Primary weather attempt failed ({}), trying {}",
                                cause,
                                city
                            );
                        }
                        _ => tracing::debug!("Acquisition {} -> {}", from, next.name()),
                    }
                    next
                }
            };
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeSource;
    use super::*;
    use crate::location::fakes::{FakeLocator, FakeSensor};
    use crate::types::sample_reading;

    fn unavailable() -> ProviderError {
        ProviderError::Status {
            status: 503,
            message: "unavailable".into(),
        }
    }

    fn coordinate() -> Coordinate {
        Coordinate::new(51.5, -0.12).unwrap()
    }

    fn acquisition(
        sensor: FakeSensor,
        locator: FakeLocator,
        source: FakeSource,
    ) -> WeatherAcquisition<FakeSensor, FakeLocator, FakeSource> {
        WeatherAcquisition::new(
            LocationResolver::new(sensor, locator, PositionOptions::default()),
            source,
            "London",
        )
    }

    #[test]
    fn test_happy_path_transitions() {
        let state = AcquisitionState::Init
            .next(AcquisitionEvent::Start, "London")
            .next(AcquisitionEvent::PreciseResolved(coordinate()), "London");
        assert!(matches!(
            state,
            AcquisitionState::Fetching(ResolvedLocation {
                provenance: Provenance::Precise,
                ..
            })
        ));

        let state = state.next(
            AcquisitionEvent::Fetched(sample_reading(12.0, 113, "Sunny")),
            "London",
        );
        assert!(matches!(
            state,
            AcquisitionState::Succeeded(SourcedReading {
                provenance: Provenance::Precise,
                ..
            })
        ));
    }

    #[test]
    fn test_sensor_failure_moves_to_approximate() {
        let state = AcquisitionState::ResolvingPrecise
            .next(AcquisitionEvent::SensorFailed(LocationError::Timeout), "London")
            .next(AcquisitionEvent::ApproximateResolved(coordinate()), "London");
        assert!(matches!(
            state,
            AcquisitionState::Fetching(ResolvedLocation {
                provenance: Provenance::Approximate,
                ..
            })
        ));
    }

    #[test]
    fn test_lookup_failure_moves_to_fallback_city() {
        let state = AcquisitionState::ResolvingPrecise
            .next(
                AcquisitionEvent::SensorFailed(LocationError::PermissionDenied),
                "Paris",
            )
            .next(
                AcquisitionEvent::LookupFailed(LocationError::Lookup("offline".into())),
                "Paris",
            );
        match state {
            AcquisitionState::Fallback {
                city,
                cause: AttemptError::Location(LocationError::Unavailable { sensor, lookup }),
            } => {
                assert_eq!(city, "Paris");
                assert!(sensor.contains("denied"));
                assert!(lookup.contains("offline"));
            }
            other => panic!("expected Fallback, got {}", other.name()),
        }
    }

    #[test]
    fn test_fallback_success_is_tagged_fallback() {
        let state = AcquisitionState::Fallback {
            city: "London".into(),
            cause: AttemptError::Provider(unavailable()),
        }
        .next(
            AcquisitionEvent::Fetched(sample_reading(9.0, 296, "Light rain")),
            "London",
        );
        assert!(matches!(
            state,
            AcquisitionState::Succeeded(SourcedReading {
                provenance: Provenance::Fallback,
                ..
            })
        ));
    }

    #[test]
    fn test_second_failure_is_terminal() {
        let state = AcquisitionState::Fetching(ResolvedLocation {
            coordinate: coordinate(),
            provenance: Provenance::Approximate,
        })
        .next(AcquisitionEvent::FetchFailed(unavailable()), "London")
        .next(AcquisitionEvent::FetchFailed(unavailable()), "London");

        match &state {
            AcquisitionState::Failed(err) => assert!(err.is_retryable()),
            other => panic!("expected Failed, got {}", other.name()),
        }

        // Terminal states ignore everything but Reset.
        let state = state.next(AcquisitionEvent::Start, "London");
        assert!(matches!(state, AcquisitionState::Failed(_)));
        let state = state.next(AcquisitionEvent::Reset, "London");
        assert!(matches!(state, AcquisitionState::Init));
    }

    #[test]
    fn test_configuration_rejection_is_not_retryable() {
        let state = AcquisitionState::Init.next(
            AcquisitionEvent::ConfigurationRejected(ConfigError::MissingSetting(
                "weather.api_key".into(),
            )),
            "London",
        );
        match state {
            AcquisitionState::Failed(err) => assert!(!err.is_retryable()),
            other => panic!("expected Failed, got {}", other.name()),
        }
    }

    #[test]
    fn test_mismatched_event_is_ignored() {
        let state = AcquisitionState::Init.next(
            AcquisitionEvent::Fetched(sample_reading(1.0, 113, "Clear")),
            "London",
        );
        assert!(matches!(state, AcquisitionState::Init));
    }

    #[tokio::test]
    async fn test_acquire_precise() {
        let source = FakeSource::new(Ok(sample_reading(18.0, 113, "Sunny")), Err(unavailable()));
        let acq = acquisition(FakeSensor::ok(51.5, -0.12), FakeLocator::ok(0.0, 0.0), source.clone());

        let sourced = acq.acquire().await.unwrap();
        assert_eq!(sourced.provenance, Provenance::Precise);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_acquire_sensor_failure_ip_success_is_approximate() {
        let locator = FakeLocator::ok(51.5, -0.12);
        let source = FakeSource::new(Ok(sample_reading(18.0, 113, "Sunny")), Err(unavailable()));
        let acq = acquisition(
            FakeSensor::failing(LocationError::PermissionDenied),
            locator.clone(),
            source,
        );

        let sourced = acq.acquire().await.unwrap();
        assert_eq!(sourced.provenance, Provenance::Approximate);
        assert_eq!(locator.calls(), 1);
    }

    #[tokio::test]
    async fn test_acquire_location_unavailable_uses_fallback_city() {
        let source = FakeSource::new(Err(unavailable()), Ok(sample_reading(7.0, 119, "Cloudy")));
        let acq = acquisition(
            FakeSensor::failing(LocationError::ServiceUnavailable),
            FakeLocator::failing("offline"),
            source.clone(),
        );

        let sourced = acq.acquire().await.unwrap();
        assert_eq!(sourced.provenance, Provenance::Fallback);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_acquire_two_failures_stop_without_third_call() {
        let source = FakeSource::new(Err(unavailable()), Err(unavailable()));
        let acq = acquisition(FakeSensor::ok(51.5, -0.12), FakeLocator::ok(0.0, 0.0), source.clone());

        let err = acq.acquire().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, AcquisitionError::Exhausted { ref city, .. } if city == "London"));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_acquire_configuration_failure_makes_no_calls() {
        let sensor = FakeSensor::ok(51.5, -0.12);
        let mut source = FakeSource::new(Ok(sample_reading(18.0, 113, "Sunny")), Err(unavailable()));
        source.configuration = Err(ConfigError::MissingSetting("weather.api_key".into()));
        let acq = acquisition(sensor.clone(), FakeLocator::ok(0.0, 0.0), source.clone());

        let err = acq.acquire().await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(source.calls(), 0);
        assert_eq!(sensor.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_error_names_sensor_and_lookup() {
        let source = FakeSource::new(Err(unavailable()), Err(unavailable()));
        let acq = acquisition(
            FakeSensor::failing(LocationError::PermissionDenied),
            FakeLocator::failing("offline"),
            source.clone(),
        );

        let err = acq.acquire().await.unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Exhausted {
                primary: AttemptError::Location(LocationError::Unavailable { .. }),
                ..
            }
        ));
        let msg = err.to_string();
        assert!(msg.contains("denied"), "{msg}");
        assert!(msg.contains("offline"), "{msg}");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_manual_retry_starts_over() {
        let source = FakeSource::new(Err(unavailable()), Err(unavailable()));
        let acq = acquisition(FakeSensor::ok(51.5, -0.12), FakeLocator::ok(0.0, 0.0), source.clone());

        assert!(acq.acquire().await.is_err());
        assert!(acq.acquire().await.is_err());
        assert_eq!(source.calls(), 4);
    }
}
