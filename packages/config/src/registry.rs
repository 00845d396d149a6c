//! Compile-time registry of remote service definitions.
//!
//! Each remote collaborator (record store, reverse geocoder, notification
//! webhook) is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`find_service`].

use serde::Deserialize;

/// A remote service definition loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDefinition {
    /// Unique identifier (e.g., `"record_store"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is used at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// JSONBin-style document store holding the whole emergency collection.
    JsonBin {
        /// API base URL (e.g., `"https://api.jsonbin.io/v3/b"`).
        base_url: String,
        /// Identifier of the shared document.
        bin_id: String,
        /// Header carrying the static secret.
        key_header: String,
        /// Environment variable holding the secret.
        key_env: String,
    },
    /// Nominatim / `OpenStreetMap` reverse geocoder.
    Nominatim {
        /// Reverse endpoint (e.g., `"https://nominatim.openstreetmap.org/reverse"`).
        base_url: String,
    },
    /// Outbound webhook receiving `{address, type}` on each new report.
    Webhook {
        /// Endpoint URL.
        url: String,
    },
}

const fn default_true() -> bool {
    true
}

impl ServiceDefinition {
    /// Returns the service's primary URL regardless of variant.
    ///
    /// For the document store this is the full document URL.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.provider {
            ProviderConfig::JsonBin {
                base_url, bin_id, ..
            } => format!("{}/{bin_id}", base_url.trim_end_matches('/')),
            ProviderConfig::Nominatim { base_url } => base_url.clone(),
            ProviderConfig::Webhook { url } => url.clone(),
        }
    }

    /// Short provider type name, as written in TOML.
    #[must_use]
    pub const fn provider_type(&self) -> &'static str {
        match self.provider {
            ProviderConfig::JsonBin { .. } => "json_bin",
            ProviderConfig::Nominatim { .. } => "nominatim",
            ProviderConfig::Webhook { .. } => "webhook",
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

/// Identifier of the record store service.
pub const RECORD_STORE: &str = "record_store";
/// Identifier of the reverse geocoder service.
pub const REVERSE_GEOCODER: &str = "reverse_geocoder";
/// Identifier of the notification webhook service.
pub const NOTIFICATION_WEBHOOK: &str = "notification_webhook";

const SERVICE_TOMLS: &[(&str, &str)] = &[
    (RECORD_STORE, include_str!("../services/record_store.toml")),
    (REVERSE_GEOCODER, include_str!("../services/reverse_geocoder.toml")),
    (
        NOTIFICATION_WEBHOOK,
        include_str!("../services/notification_webhook.toml"),
    ),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 3;

/// Returns all service definitions (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<ServiceDefinition> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse service '{name}': {e}"))
        })
        .collect()
}

/// Looks up a service definition by id.
#[must_use]
pub fn find_service(id: &str) -> Option<ServiceDefinition> {
    all_services().into_iter().find(|s| s.id == id)
}
