#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration for the emergency map.
//!
//! Remote endpoints are defined as TOML files under `services/` and
//! embedded at compile time (see [`registry`]). Secrets and URL overrides
//! come from the environment and are resolved once into [`Settings`].
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `JSONBIN_API_KEY` | For the remote store | Secret sent in the store's key header |
//! | `EMERGENCY_MAP_STORE_URL` | No | Full record store URL (overrides `base_url/bin_id`) |
//! | `EMERGENCY_MAP_GEOCODER_URL` | No | Reverse geocoder endpoint |
//! | `EMERGENCY_MAP_WEBHOOK_URL` | No | Notification webhook endpoint |
//! | `EMERGENCY_MAP_HTTP_TIMEOUT_SECS` | No | Per-request HTTP timeout (default 10) |

pub mod map;
pub mod registry;
pub mod settings;

pub use map::MapDefaults;
pub use settings::Settings;

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing environment variable: {name}")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: String,
    },

    /// Environment variable is set but unusable.
    #[error("Invalid value for {name}: {message}")]
    InvalidEnv {
        /// Name of the environment variable.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A service definition is missing or of the wrong provider type.
    #[error("Service '{id}' is not configured: {message}")]
    Service {
        /// Service identifier.
        id: String,
        /// Description of the problem.
        message: String,
    },
}
