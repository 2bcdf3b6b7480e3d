//! Device position lookup.

use std::time::Duration;

use crate::config::Config;
use crate::error::GeolocationError;
use crate::geo::GeoPoint;

/// Options of a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    /// Ask for the most precise position the device can give.
    pub enable_high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(8000),
        }
    }
}

impl GeolocationOptions {
    /// Options taken from the session config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            enable_high_accuracy: config.high_accuracy,
            timeout: config.geolocation_timeout(),
        }
    }
}

/// Provider of the device position.
#[async_trait::async_trait]
pub trait Geolocator: Send + Sync {
    /// Returns the current position of the device.
    ///
    /// Implementations may ignore `options.timeout`; callers should use [`locate_with_timeout`].
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<GeoPoint, GeolocationError>;
}

/// Asks the geolocator for the position, failing with [`GeolocationError::Timeout`] when it does
/// not answer within `options.timeout`.
pub async fn locate_with_timeout(
    geolocator: &dyn Geolocator,
    options: &GeolocationOptions,
) -> Result<GeoPoint, GeolocationError> {
    match tokio::time::timeout(options.timeout, geolocator.current_position(options)).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout),
    }
}

/// Geolocator that always reports the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGeolocator {
    position: GeoPoint,
}

impl FixedGeolocator {
    /// Creates a geolocator reporting `position`.
    pub fn new(position: GeoPoint) -> Self {
        Self { position }
    }
}

#[async_trait::async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<GeoPoint, GeolocationError> {
        Ok(self.position)
    }
}

/// Geolocator of a device where the user refused to share the position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeniedGeolocator;

#[async_trait::async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<GeoPoint, GeolocationError> {
        Err(GeolocationError::Denied)
    }
}
