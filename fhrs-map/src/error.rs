//! Error types used across the crate.

use thiserror::Error;

/// Error that can occur when loading establishments from the ratings API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Could not reach the remote server or the connection broke mid-response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status code.
    #[error("ratings API responded with HTTP {0}")]
    Status(u16),

    /// Response body is not valid JSON.
    #[error("failed to decode establishments response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request URL could not be built from the configured endpoint.
    #[error("invalid API endpoint `{0}`")]
    InvalidEndpoint(String),
}

/// Error returned by a [`Geolocator`](crate::geolocation::Geolocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The user or the platform refused to share the position.
    #[error("permission to read the device position was denied")]
    Denied,

    /// The platform has no way to determine the position.
    #[error("device position is unavailable")]
    Unavailable,

    /// No position arrived within the configured timeout.
    #[error("timed out waiting for the device position")]
    Timeout,
}

/// Error from a [`MapSessionHandle`](crate::session::MapSessionHandle).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session loop has exited and no longer accepts commands.
    #[error("map session is not running")]
    NotRunning,
}

/// Error parsing a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config document is not valid JSON or has fields of the wrong type.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// A value is outside of its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}
