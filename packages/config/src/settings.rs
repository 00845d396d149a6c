//! Runtime settings resolved from the service registry and environment.

use std::time::Duration;

use crate::registry::{self, ProviderConfig};
use crate::{ConfigError, MapDefaults};

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved record store endpoint.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Full document URL used for both GET and PUT.
    pub url: String,
    /// Header carrying the static secret.
    pub key_header: String,
    /// Environment variable the secret is read from.
    pub key_env: String,
    /// The secret, if present in the environment.
    pub api_key: Option<String>,
}

impl StoreSettings {
    /// Returns the secret or a [`ConfigError::MissingEnv`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] if the secret is unset.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnv {
                name: self.key_env.clone(),
            })
    }
}

/// Everything the binaries need to wire up the remote collaborators.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Record store endpoint.
    pub store: StoreSettings,
    /// Reverse geocoder endpoint.
    pub geocoder_url: String,
    /// Notification webhook, `None` when the service is disabled.
    pub webhook_url: Option<String>,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Base map defaults.
    pub map: MapDefaults,
}

impl Settings {
    /// Resolves settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a service definition is missing or an
    /// override is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a service definition is missing or an
    /// override is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_def = required(registry::RECORD_STORE)?;
        let ProviderConfig::JsonBin {
            key_header,
            key_env,
            ..
        } = &store_def.provider
        else {
            return Err(wrong_provider(&store_def.id, "json_bin"));
        };
        let store = StoreSettings {
            url: lookup("EMERGENCY_MAP_STORE_URL").unwrap_or_else(|| store_def.url()),
            key_header: key_header.clone(),
            key_env: key_env.clone(),
            api_key: lookup(key_env.as_str()).filter(|k| !k.trim().is_empty()),
        };

        let geocoder_def = required(registry::REVERSE_GEOCODER)?;
        if !matches!(geocoder_def.provider, ProviderConfig::Nominatim { .. }) {
            return Err(wrong_provider(&geocoder_def.id, "nominatim"));
        }
        let geocoder_url =
            lookup("EMERGENCY_MAP_GEOCODER_URL").unwrap_or_else(|| geocoder_def.url());

        let webhook_def = required(registry::NOTIFICATION_WEBHOOK)?;
        let webhook_url = lookup("EMERGENCY_MAP_WEBHOOK_URL").or_else(|| {
            if webhook_def.enabled {
                Some(webhook_def.url())
            } else {
                log::info!("Notification webhook disabled; reports will not be forwarded");
                None
            }
        });

        let http_timeout = match lookup("EMERGENCY_MAP_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::InvalidEnv {
                    name: "EMERGENCY_MAP_HTTP_TIMEOUT_SECS".to_string(),
                    message: format!("expected a positive number of seconds, got '{raw}'"),
                })?,
            None => DEFAULT_HTTP_TIMEOUT,
        };

        Ok(Self {
            store,
            geocoder_url,
            webhook_url,
            http_timeout,
            map: MapDefaults::default(),
        })
    }
}

fn required(id: &str) -> Result<registry::ServiceDefinition, ConfigError> {
    registry::find_service(id).ok_or_else(|| ConfigError::Service {
        id: id.to_string(),
        message: "no embedded definition".to_string(),
    })
}

fn wrong_provider(id: &str, expected: &str) -> ConfigError {
    ConfigError::Service {
        id: id.to_string(),
        message: format!("expected provider type '{expected}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(
            settings.store.url,
            "https://api.jsonbin.io/v3/b/692432b0d0ea881f40fcb70a"
        );
        assert_eq!(settings.store.key_header, "X-Master-Key");
        assert!(settings.store.api_key.is_none());
        assert!(settings.store.require_api_key().is_err());
        assert_eq!(settings.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(settings.webhook_url.is_some());
    }

    #[test]
    fn environment_overrides_apply() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("JSONBIN_API_KEY", "secret"),
            ("EMERGENCY_MAP_STORE_URL", "http://localhost:9000/b/test"),
            ("EMERGENCY_MAP_WEBHOOK_URL", "http://localhost:9001/hook"),
            ("EMERGENCY_MAP_HTTP_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(settings.store.require_api_key().unwrap(), "secret");
        assert_eq!(settings.store.url, "http://localhost:9000/b/test");
        assert_eq!(
            settings.webhook_url.as_deref(),
            Some("http://localhost:9001/hook")
        );
        assert_eq!(settings.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let settings = Settings::from_lookup(lookup_from(&[("JSONBIN_API_KEY", "  ")])).unwrap();
        assert!(matches!(
            settings.store.require_api_key(),
            Err(ConfigError::MissingEnv { name }) if name == "JSONBIN_API_KEY"
        ));
    }

    #[test]
    fn rejects_bad_timeout() {
        let result = Settings::from_lookup(lookup_from(&[(
            "EMERGENCY_MAP_HTTP_TIMEOUT_SECS",
            "soon",
        )]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }
}
