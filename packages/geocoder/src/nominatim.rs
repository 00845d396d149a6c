//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! The public instance allows at most one request per second and requires
//! an identifying user agent; reports are rare enough that no client-side
//! rate limiting is done.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use emergency_map_emergency_models::Coordinates;

use crate::address::AddressParts;
use crate::{GeocodeError, ReverseGeocoder};

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Creates a geocoder sending requests to `base_url` (e.g.,
    /// `"https://nominatim.openstreetmap.org/reverse"`).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn resolve_address(&self, coords: Coordinates) -> Result<String, GeocodeError> {
        reverse(&self.client, &self.base_url, coords).await
    }
}

/// Reverse geocodes a single coordinate pair.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the server returns
/// a non-success status, or the response has no usable address.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    coords: Coordinates,
) -> Result<String, GeocodeError> {
    let lat = coords.lat.to_string();
    let lon = coords.lng.to_string();

    let body: serde_json::Value = client
        .get(base_url)
        .query(&[
            ("format", "jsonv2"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    parse_response(&body)
}

/// Parses a Nominatim reverse response into a display address.
fn parse_response(body: &serde_json::Value) -> Result<String, GeocodeError> {
    if let Some(error) = body.get("error").and_then(serde_json::Value::as_str) {
        return Err(GeocodeError::Malformed {
            message: format!("Nominatim returned an error: {error}"),
        });
    }

    let address = body.get("address").ok_or_else(|| GeocodeError::Malformed {
        message: "Missing address in Nominatim response".to_string(),
    })?;

    let parts: AddressParts =
        serde_json::from_value(address.clone()).map_err(|e| GeocodeError::Malformed {
            message: format!("Unexpected address shape: {e}"),
        })?;

    parts.display().ok_or_else(|| GeocodeError::Malformed {
        message: "Nominatim address has no displayable components".to_string(),
    })
}
