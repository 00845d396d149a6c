//! Marker synchronization.

use emergency_map_emergency_models::Emergency;

use crate::filter::FilterState;
use crate::records::RecordSet;
use crate::style::{emergency_popup, emergency_style};
use crate::surface::{MapSurface, MarkerId, MarkerLayer, MarkerSpec};

/// Owns the emergency markers on a surface.
///
/// Every sync removes all markers it previously drew and then draws one
/// marker per record in the effective view set, so the drawn set never
/// drifts from the data no matter how often it runs.
#[derive(Debug, Default)]
pub struct MarkerSynchronizer {
    /// Drawn marker and the index of the record it is bound to.
    bound: Vec<(MarkerId, usize)>,
    synced: Option<(u64, u64)>,
}

impl MarkerSynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the markers for `records` under `filter`.
    ///
    /// Returns the number of markers drawn.
    pub fn sync(
        &mut self,
        surface: &mut dyn MapSurface,
        records: &[Emergency],
        filter: &FilterState,
    ) -> usize {
        self.clear(surface);

        for (index, record) in records.iter().enumerate() {
            if !filter.admits(record) {
                if !record.location.is_valid() {
                    log::warn!(
                        "Skipping {} record with invalid location {}",
                        record.emergency_type,
                        record.location
                    );
                }
                continue;
            }
            let id = surface.add_marker(MarkerSpec {
                layer: MarkerLayer::Emergencies,
                position: record.location,
                style: emergency_style(record),
                popup: emergency_popup(record),
            });
            self.bound.push((id, index));
        }

        log::debug!(
            "Synced {} of {} emergency markers (active: {:?})",
            self.bound.len(),
            records.len(),
            filter.active_ids()
        );
        self.bound.len()
    }

    /// Syncs only if the record version or the filter changed since the
    /// last call. Returns whether markers were rebuilt.
    pub fn sync_if_changed(
        &mut self,
        surface: &mut dyn MapSurface,
        records: &RecordSet,
        filter: &FilterState,
    ) -> bool {
        let key = (records.version(), filter.generation());
        if self.synced == Some(key) {
            return false;
        }
        self.sync(surface, records.records(), filter);
        self.synced = Some(key);
        true
    }

    /// Removes every marker this synchronizer drew.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        for (id, _) in self.bound.drain(..) {
            if !surface.remove_marker(id) {
                log::debug!("Marker {id:?} was already gone");
            }
        }
        self.synced = None;
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.bound.len()
    }

    /// Drawn markers with the index of their bound record.
    #[must_use]
    pub fn bound(&self) -> &[(MarkerId, usize)] {
        &self.bound
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use emergency_map_emergency_models::{Coordinates, EmergencyType, OpenEnum, Severity};

    use super::*;
    use crate::surface::InMemorySurface;

    fn record(emergency_type: &str, lat: f64) -> Emergency {
        Emergency {
            emergency_type: OpenEnum::parse(emergency_type),
            location: Coordinates { lat, lng: 120.58 },
            address: "Angeles City".to_string(),
            severity: Severity::Medium.into(),
            description: String::new(),
            timestamp: Utc::now(),
            reported_by: None,
        }
    }

    fn sample() -> Vec<Emergency> {
        vec![
            record("fire", 15.10),
            record("flood", 15.11),
            record("fire", 15.12),
            record("earthquake", 15.13),
            record("volcano", 15.14),
            record("fire", 95.0),
        ]
    }

    fn positions(surface: &InMemorySurface) -> Vec<Coordinates> {
        surface.markers().map(|(_, spec)| spec.position).collect()
    }

    #[test]
    fn markers_match_effective_view_set() {
        let records = sample();
        let subsets: [&[EmergencyType]; 4] = [
            &[],
            &[EmergencyType::Fire],
            &[EmergencyType::Flood, EmergencyType::Earthquake],
            EmergencyType::all(),
        ];

        let mut surface = InMemorySurface::new();
        let mut sync = MarkerSynchronizer::new();
        for active in subsets {
            let filter = FilterState::only(active);
            let expected = records
                .iter()
                .filter(|r| r.location.is_valid())
                .filter(|r| r.known_type().is_some_and(|t| active.contains(&t)))
                .count();

            let drawn = sync.sync(&mut surface, &records, &filter);
            assert_eq!(drawn, expected);
            assert_eq!(drawn, filter.active_count(&records));
            assert_eq!(surface.len(), expected);
            for &(_, index) in sync.bound() {
                let bound_type = records[index].known_type().unwrap();
                assert!(active.contains(&bound_type));
            }
        }
    }

    #[test]
    fn sync_is_idempotent() {
        let records = sample();
        let filter = FilterState::new();
        let mut surface = InMemorySurface::new();
        let mut sync = MarkerSynchronizer::new();

        sync.sync(&mut surface, &records, &filter);
        let first = positions(&surface);
        sync.sync(&mut surface, &records, &filter);

        assert_eq!(positions(&surface), first);
        assert_eq!(surface.len(), 4);
    }

    #[test]
    fn sync_if_changed_tracks_versions() {
        let mut records = RecordSet::new();
        records.replace(sample());
        let mut filter = FilterState::new();
        let mut surface = InMemorySurface::new();
        let mut sync = MarkerSynchronizer::new();

        assert!(sync.sync_if_changed(&mut surface, &records, &filter));
        assert!(!sync.sync_if_changed(&mut surface, &records, &filter));

        filter.toggle(EmergencyType::Fire);
        assert!(sync.sync_if_changed(&mut surface, &records, &filter));
        assert_eq!(surface.len(), 2);

        records.replace(vec![record("fire", 15.2)]);
        assert!(sync.sync_if_changed(&mut surface, &records, &filter));
        assert!(surface.is_empty());
    }

    #[test]
    fn invalid_locations_are_not_drawn() {
        let records = vec![record("fire", 95.0), record("fire", 15.0)];
        let mut surface = InMemorySurface::new();
        let mut sync = MarkerSynchronizer::new();

        assert_eq!(sync.sync(&mut surface, &records, &FilterState::new()), 1);
        assert_eq!(sync.bound()[0].1, 1);
    }
}
