//! Weather acquisition for StyleMe
//!
//! Resolves where the user is (host sensor, then IP geolocation), fetches
//! current conditions from wttr.in, and falls back to a configured city
//! when the primary attempt fails.

pub mod acquisition;
pub mod error;
pub mod location;
pub mod provider;
pub mod types;

pub use acquisition::{AcquisitionEvent, AcquisitionState, WeatherAcquisition};
pub use error::{AcquisitionError, AttemptError, LocationError, ProviderError};
pub use location::{
    HostSensor, IpApiLocator, IpLocator, LocationResolver, LocationSensor, PositionOptions,
};
pub use provider::{parse_envelope, NumericField, WeatherProvider, WeatherSource};
pub use types::*;
