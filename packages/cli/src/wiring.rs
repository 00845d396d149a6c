//! Builds the remote collaborators from settings.

use std::sync::Arc;

use emergency_map_config::{MapDefaults, Settings, registry};
use emergency_map_emergency_models::Coordinates;
use emergency_map_geocoder::{GeocodeError, NominatimGeocoder, ReverseGeocoder};
use emergency_map_notify::{NotificationDispatcher, WebhookNotifier};
use emergency_map_store::{EmergencyStore, JsonBinStore, MemoryStore};

const USER_AGENT: &str = concat!(
    "emergency-map/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/emergency-map/emergency-map)"
);

/// Everything a command needs to talk to the outside world.
pub struct Services {
    pub store: Arc<dyn EmergencyStore>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub dispatcher: NotificationDispatcher,
    pub map: MapDefaults,
}

impl Services {
    /// Connects to the configured store, geocoder and webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, the store secret is
    /// missing or the HTTP client cannot be built.
    pub fn connect() -> Result<Self, Box<dyn std::error::Error>> {
        let settings = Settings::from_env()?;
        let api_key = settings.store.require_api_key()?;

        let client = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        log::debug!("Record store: {}", settings.store.url);
        let store = JsonBinStore::new(
            client.clone(),
            settings.store.url.clone(),
            settings.store.key_header.clone(),
            api_key,
        );
        let geocoder = NominatimGeocoder::new(client.clone(), settings.geocoder_url.clone());
        let dispatcher = settings.webhook_url.map_or_else(
            NotificationDispatcher::disabled,
            |url| NotificationDispatcher::new(Arc::new(WebhookNotifier::new(client, url))),
        );

        Ok(Self {
            store: Arc::new(store),
            geocoder: Arc::new(geocoder),
            dispatcher,
            map: settings.map,
        })
    }

    /// In-process store, no geocoding, no notifications.
    #[must_use]
    pub fn offline() -> Self {
        log::info!("Running offline; reports are kept in memory only");
        Self {
            store: Arc::new(MemoryStore::new()),
            geocoder: Arc::new(OfflineGeocoder),
            dispatcher: NotificationDispatcher::disabled(),
            map: MapDefaults::default(),
        }
    }
}

/// Geocoder used offline. Every lookup fails, so reports fall back to the
/// placeholder address.
struct OfflineGeocoder;

#[async_trait::async_trait]
impl ReverseGeocoder for OfflineGeocoder {
    async fn resolve_address(&self, coords: Coordinates) -> Result<String, GeocodeError> {
        Err(GeocodeError::Malformed {
            message: format!("no geocoder available offline for {coords}"),
        })
    }
}

/// Prints the service registry and the base map settings.
pub fn print_services(map: &MapDefaults) {
    let services = registry::all_services();
    println!("{:<24} {:<10} {:<8} URL", "ID", "TYPE", "ENABLED");
    println!("{}", "-".repeat(80));
    for service in &services {
        println!(
            "{:<24} {:<10} {:<8} {}",
            service.id,
            service.provider_type(),
            if service.enabled { "yes" } else { "no" },
            service.url()
        );
    }

    println!();
    println!("Map");
    println!("  anchor  {}", map.anchor_id);
    println!("  center  {}", map.center);
    println!("  zoom    {} (range {}-{})", map.zoom, map.min_zoom, map.max_zoom);
    println!("  tiles   {}", map.tile_url);
}
