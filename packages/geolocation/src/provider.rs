//! Built-in location providers.
//!
//! Terminal builds have no position sensor, so the binaries take the fix
//! from the command line ([`FixedLocationProvider`]) or report that none is
//! available ([`UnavailableLocationProvider`]).

use chrono::Utc;
use emergency_map_emergency_models::Coordinates;

use crate::{LocationError, LocationProvider, Position, PositionOptions};

/// Provider that always reports the same coordinates as a fresh fix.
///
/// The fix carries no accuracy radius.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    coords: Coordinates,
}

impl FixedLocationProvider {
    /// Creates a provider reporting `coords`.
    #[must_use]
    pub const fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait::async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Ok(Position {
            coords: self.coords,
            accuracy_m: None,
            captured_at: Utc::now(),
        })
    }
}

/// Provider that never produces a fix.
#[derive(Debug, Clone)]
pub struct UnavailableLocationProvider {
    error: LocationError,
}

impl UnavailableLocationProvider {
    /// Creates a provider failing every request with `error`.
    #[must_use]
    pub const fn new(error: LocationError) -> Self {
        Self { error }
    }
}

impl Default for UnavailableLocationProvider {
    fn default() -> Self {
        Self::new(LocationError::PositionUnavailable)
    }
}

#[async_trait::async_trait]
impl LocationProvider for UnavailableLocationProvider {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Err(self.error.clone())
    }
}
