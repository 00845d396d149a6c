#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for emergency reports.
//!
//! Converts the reporter's coordinates into a display address with a
//! single request to a Nominatim reverse endpoint. Failures are returned
//! as [`GeocodeError`]; the reporting flow treats them as non-fatal and
//! substitutes a placeholder address. There is no retry and no caching.

pub mod address;
pub mod nominatim;

use emergency_map_emergency_models::Coordinates;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// Errors from reverse geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response did not contain a usable address.
    #[error("Malformed geocoder response: {message}")]
    Malformed {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Converts coordinates to a display address.
#[async_trait::async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolves `coords` to a comma-separated display address.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails or the response has
    /// no usable address fields.
    async fn resolve_address(&self, coords: Coordinates) -> Result<String, GeocodeError>;
}
