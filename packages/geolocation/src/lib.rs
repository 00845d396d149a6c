#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Device location resolution.
//!
//! Wraps a platform location source ([`LocationProvider`]) into a single
//! asynchronous attempt bounded by a timeout. Positions older than the
//! configured maximum age are rejected, so with the default options only a
//! fix taken after the request started (within one second of timestamp
//! slack) is accepted. There is no retry;
//! callers decide whether to prompt again.

pub mod provider;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use emergency_map_emergency_models::Coordinates;

pub use provider::{FixedLocationProvider, UnavailableLocationProvider};

/// How long a single location request may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack allowed for providers that stamp fixes at whole-second
/// granularity. A fix taken in the same second as the request still counts
/// as fresh.
pub const TIMESTAMP_TOLERANCE: TimeDelta = TimeDelta::seconds(1);

/// Options passed to the location provider for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask the provider for its most accurate fix.
    pub high_accuracy: bool,
    /// Upper bound on the whole request.
    pub timeout: Duration,
    /// Oldest acceptable fix, measured from the start of the request
    /// (less [`TIMESTAMP_TOLERANCE`]).
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

/// A position fix reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Fix coordinates.
    pub coords: Coordinates,
    /// Accuracy radius in meters, if the provider reports one.
    pub accuracy_m: Option<f64>,
    /// When the fix was taken.
    pub captured_at: DateTime<Utc>,
}

/// Why a location could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The user or platform refused location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// No usable fix could be obtained.
    #[error("Position unavailable")]
    PositionUnavailable,

    /// No fix arrived before the timeout elapsed.
    #[error("Location request timed out")]
    Timeout,

    /// Any other provider failure.
    #[error("Location error: {message}")]
    Unknown {
        /// Provider-supplied description.
        message: String,
    },
}

/// A platform location source.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// Requests one position fix.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the provider cannot produce a fix.
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError>;
}

/// Resolves the reporter's coordinates with a single bounded attempt.
#[derive(Clone)]
pub struct GeolocationResolver {
    provider: Arc<dyn LocationProvider>,
    options: PositionOptions,
}

impl GeolocationResolver {
    /// Creates a resolver with the default options (high accuracy, 10s
    /// timeout, no cached fixes).
    #[must_use]
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            options: PositionOptions::default(),
        }
    }

    /// Replaces the request options.
    #[must_use]
    pub const fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the request options.
    #[must_use]
    pub const fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Requests the current position once.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Timeout`] if the provider does not answer
    /// within the timeout, [`LocationError::PositionUnavailable`] if the
    /// fix is stale or out of range, and any provider error unchanged.
    pub async fn resolve(&self) -> Result<Coordinates, LocationError> {
        let requested_at = Utc::now();

        let position = tokio::time::timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        .map_err(|_| {
            log::warn!(
                "Location request timed out after {:?}",
                self.options.timeout
            );
            LocationError::Timeout
        })??;

        if self.is_stale(&position, requested_at) {
            log::warn!(
                "Rejecting cached position from {} (maximum age {:?})",
                position.captured_at,
                self.options.maximum_age
            );
            return Err(LocationError::PositionUnavailable);
        }

        if !position.coords.is_valid() {
            log::warn!("Rejecting out-of-range position {}", position.coords);
            return Err(LocationError::PositionUnavailable);
        }

        log::debug!(
            "Resolved position {} (accuracy {:?} m)",
            position.coords,
            position.accuracy_m
        );
        Ok(position.coords)
    }

    fn is_stale(&self, position: &Position, requested_at: DateTime<Utc>) -> bool {
        let max_age = TimeDelta::from_std(self.options.maximum_age).unwrap_or(TimeDelta::MAX);
        requested_at
            .checked_sub_signed(max_age)
            .and_then(|oldest| oldest.checked_sub_signed(TIMESTAMP_TOLERANCE))
            .is_some_and(|oldest| position.captured_at < oldest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProvider;

    #[async_trait::async_trait]
    impl LocationProvider for SlowProvider {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Position, LocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(LocationError::Unknown {
                message: "should have timed out".to_string(),
            })
        }
    }

    struct CachedProvider;

    /// Reports fixes with the sub-second part truncated.
    struct WholeSecondProvider;

    #[async_trait::async_trait]
    impl LocationProvider for WholeSecondProvider {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Position, LocationError> {
            let now = Utc::now();
            Ok(Position {
                coords: Coordinates {
                    lat: 15.1433,
                    lng: 120.5833,
                },
                accuracy_m: None,
                captured_at: now - TimeDelta::nanoseconds(i64::from(now.timestamp_subsec_nanos())),
            })
        }
    }

    #[async_trait::async_trait]
    impl LocationProvider for CachedProvider {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Position, LocationError> {
            Ok(Position {
                coords: Coordinates {
                    lat: 15.1433,
                    lng: 120.5833,
                },
                accuracy_m: Some(5.0),
                captured_at: Utc::now() - TimeDelta::minutes(5),
            })
        }
    }

    #[tokio::test]
    async fn resolves_fresh_fix() {
        let provider = FixedLocationProvider::new(Coordinates {
            lat: 15.1433,
            lng: 120.5833,
        });
        let resolver = GeolocationResolver::new(Arc::new(provider));
        let coords = resolver.resolve().await.unwrap();
        assert!((coords.lat - 15.1433).abs() < 1e-9);
        assert!((coords.lng - 120.5833).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_ten_seconds() {
        let resolver = GeolocationResolver::new(Arc::new(SlowProvider));
        assert_eq!(resolver.options().timeout, Duration::from_secs(10));
        assert_eq!(resolver.resolve().await, Err(LocationError::Timeout));
    }

    #[tokio::test]
    async fn rejects_cached_fix() {
        let resolver = GeolocationResolver::new(Arc::new(CachedProvider));
        assert_eq!(
            resolver.resolve().await,
            Err(LocationError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn accepts_whole_second_timestamps() {
        let resolver = GeolocationResolver::new(Arc::new(WholeSecondProvider));
        assert_eq!(resolver.options().maximum_age, Duration::ZERO);
        assert!(resolver.resolve().await.is_ok());
    }

    #[tokio::test]
    async fn accepts_cached_fix_within_maximum_age() {
        let resolver =
            GeolocationResolver::new(Arc::new(CachedProvider)).with_options(PositionOptions {
                maximum_age: Duration::from_secs(600),
                ..PositionOptions::default()
            });
        assert!(resolver.resolve().await.is_ok());
    }

    #[tokio::test]
    async fn passes_provider_errors_through() {
        let resolver = GeolocationResolver::new(Arc::new(UnavailableLocationProvider::new(
            LocationError::PermissionDenied,
        )));
        assert_eq!(
            resolver.resolve().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[test]
    fn default_options_request_high_accuracy_without_cache() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.maximum_age, Duration::ZERO);
    }
}
