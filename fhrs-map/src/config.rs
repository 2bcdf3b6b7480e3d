//! Runtime configuration of the map session and the ratings API client.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::geo::GeoPoint;

/// Default establishment search endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.ratings.food.gov.uk/Establishments";

/// Default template of the per-establishment details page. `{id}` is replaced with the identifier.
pub const DEFAULT_DETAILS_URL: &str = "https://ratings.food.gov.uk/business/en-GB/{id}";

/// Settings of the ratings API client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Establishment search endpoint.
    pub base_url: String,
    /// Value of the `x-api-version` header.
    pub api_version: String,
    /// Value of the `Accept-Language` header.
    pub accept_language: String,
    /// Number of establishments requested per query.
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            api_version: "2".to_string(),
            accept_language: "en-GB".to_string(),
            page_size: 200,
        }
    }
}

/// Bounds applied when turning a view into a query.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Below this zoom level nothing is requested and markers are cleared.
    pub min_zoom: u32,
    /// Smallest search radius, in miles.
    pub min_radius_miles: f64,
    /// Largest search radius, in miles.
    pub max_radius_miles: f64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            min_zoom: 17,
            min_radius_miles: 0.5,
            max_radius_miles: 25.0,
        }
    }
}

/// Full configuration of a [`MapSession`](crate::session::MapSession).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ratings API settings.
    pub api: ApiConfig,
    /// Query bounds.
    pub limits: QueryLimits,
    /// Quiet period after the last pan/zoom before a query is sent, in milliseconds.
    pub debounce_ms: u64,
    /// How long to wait for the device position, in milliseconds.
    pub geolocation_timeout_ms: u64,
    /// Ask the device for its most precise position.
    pub high_accuracy: bool,
    /// Where the map starts and what is used when the position is unknown.
    pub fallback_location: GeoPoint,
    /// Zoom level of the initial view.
    pub initial_zoom: u32,
    /// Zoom level used after the startup position is found.
    pub located_zoom: u32,
    /// Zoom level used after an explicit locate request.
    pub locate_zoom: u32,
    /// Template of the establishment details link.
    pub details_url: String,
    /// Ignore responses to requests that were superseded by a newer one.
    pub discard_stale_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            limits: QueryLimits::default(),
            debounce_ms: 500,
            geolocation_timeout_ms: 8000,
            high_accuracy: true,
            fallback_location: GeoPoint::new(51.5074, -0.1278),
            initial_zoom: 14,
            located_zoom: 15,
            locate_zoom: 18,
            details_url: DEFAULT_DETAILS_URL.to_string(),
            discard_stale_responses: true,
        }
    }
}

impl Config {
    /// Parses a JSON config document. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that all values are in their allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if !(limits.min_radius_miles.is_finite() && limits.min_radius_miles > 0.0) {
            return Err(ConfigError::Invalid {
                field: "limits.min_radius_miles",
                reason: format!("must be a positive number, got {}", limits.min_radius_miles),
            });
        }

        if !(limits.max_radius_miles.is_finite() && limits.max_radius_miles >= limits.min_radius_miles)
        {
            return Err(ConfigError::Invalid {
                field: "limits.max_radius_miles",
                reason: format!(
                    "must not be less than min_radius_miles ({}), got {}",
                    limits.min_radius_miles, limits.max_radius_miles
                ),
            });
        }

        if self.api.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "api.page_size",
                reason: "must be at least 1".to_string(),
            });
        }

        if !self.fallback_location.is_finite() {
            return Err(ConfigError::Invalid {
                field: "fallback_location",
                reason: "coordinates must be finite".to_string(),
            });
        }

        Ok(())
    }

    /// Debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Geolocation timeout as a duration.
    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_json_str("{}").expect("valid config");
        assert_eq!(config, Config::default());
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.geolocation_timeout(), Duration::from_secs(8));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = Config::from_json_str(
            r#"{"debounce_ms": 250, "limits": {"min_zoom": 15}, "api": {"page_size": 50}}"#,
        )
        .expect("valid config");

        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.limits.min_zoom, 15);
        assert_eq!(config.limits.max_radius_miles, 25.0);
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.api_version, "2");
    }

    #[test]
    fn inverted_radius_bounds_are_rejected() {
        let result = Config::from_json_str(
            r#"{"limits": {"min_radius_miles": 10.0, "max_radius_miles": 1.0}}"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "limits.max_radius_miles", .. })
        ));
    }
}
