//! Map rendering surface.
//!
//! The surface is an opaque collaborator that draws markers. Only the
//! [`MarkerSynchronizer`](crate::MarkerSynchronizer) and the
//! [`EvacuationLayer`](crate::EvacuationLayer) add or remove markers.

use std::collections::BTreeMap;

use emergency_map_emergency_models::Coordinates;

use crate::style::{MarkerStyle, Popup};

/// Handle to one drawn marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Which overlay a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerLayer {
    Emergencies,
    Evacuation,
}

/// Everything a surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub layer: MarkerLayer,
    pub position: Coordinates,
    pub style: MarkerStyle,
    pub popup: Popup,
}

/// A map widget that can draw and remove markers.
pub trait MapSurface {
    /// Draws a marker and returns its handle.
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId;

    /// Removes a marker. Returns `false` if the handle was unknown.
    fn remove_marker(&mut self, id: MarkerId) -> bool;

    /// Releases the widget. Further calls are ignored.
    fn dispose(&mut self);
}

/// A surface that only keeps its markers in memory.
///
/// Used by the terminal front end to print the current map and by tests to
/// inspect what would be drawn.
#[derive(Debug, Default)]
pub struct InMemorySurface {
    markers: BTreeMap<MarkerId, MarkerSpec>,
    next_id: u64,
    disposed: bool,
}

impl InMemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers currently drawn, in creation order.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &MarkerSpec)> {
        self.markers.iter().map(|(id, spec)| (*id, spec))
    }

    /// Markers currently drawn on `layer`.
    pub fn layer(&self, layer: MarkerLayer) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.values().filter(move |spec| spec.layer == layer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl MapSurface for InMemorySurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        if self.disposed {
            log::debug!("Ignoring marker on disposed surface");
        } else {
            self.markers.insert(id, spec);
        }
        id
    }

    fn remove_marker(&mut self, id: MarkerId) -> bool {
        self.markers.remove(&id).is_some()
    }

    fn dispose(&mut self) {
        self.markers.clear();
        self.disposed = true;
    }
}
