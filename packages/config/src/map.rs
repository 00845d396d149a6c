//! Base map defaults.

use emergency_map_emergency_models::Coordinates;

/// Initial view and tile source of the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDefaults {
    /// View anchor the map widget is mounted on.
    pub anchor_id: String,
    /// Initial center (Angeles City, Philippines).
    pub center: Coordinates,
    /// Initial zoom level.
    pub zoom: u8,
    /// Minimum zoom level.
    pub min_zoom: u8,
    /// Maximum zoom level.
    pub max_zoom: u8,
    /// Tile URL template.
    pub tile_url: String,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            anchor_id: "emergenciesMap".to_string(),
            center: Coordinates {
                lat: 15.1433,
                lng: 120.5833,
            },
            zoom: 13,
            min_zoom: 3,
            max_zoom: 19,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_view_is_within_zoom_bounds() {
        let map = MapDefaults::default();
        assert!((map.min_zoom..=map.max_zoom).contains(&map.zoom));
        assert!(map.center.is_valid());
        for placeholder in ["{z}", "{x}", "{y}"] {
            assert!(map.tile_url.contains(placeholder));
        }
    }
}
