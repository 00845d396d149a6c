//! Evacuation center types and the built-in center list.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::Coordinates;

/// Occupancy status of an evacuation center.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CenterStatus {
    /// Accepting evacuees.
    Available,
    /// Nearly full.
    Limited,
    /// Not accepting evacuees.
    Full,
}

/// A designated evacuation center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationCenter {
    /// Stable identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Center location.
    pub location: Coordinates,
    /// Number of people the center can hold.
    pub capacity: u32,
    /// Current status.
    pub status: CenterStatus,
}

/// Evacuation centers served around Angeles City.
#[must_use]
pub fn default_centers() -> Vec<EvacuationCenter> {
    [
        (1, "Balibago Evacuation Center", 15.1663, 120.5901, 500, CenterStatus::Available),
        (2, "Malabañas Evacuation Center", 15.1509, 120.5898, 300, CenterStatus::Limited),
        (3, "Pandan Evacuation Center", 15.1522, 120.6054, 800, CenterStatus::Available),
    ]
    .into_iter()
    .map(|(id, name, lat, lng, capacity, status)| EvacuationCenter {
        id,
        name: name.to_string(),
        location: Coordinates { lat, lng },
        capacity,
        status,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_centers_are_valid() {
        let centers = default_centers();
        assert_eq!(centers.len(), 3);
        assert!(centers.iter().all(|c| c.location.is_valid()));
        assert_eq!(centers[1].status, CenterStatus::Limited);
    }
}
