//! Evacuation center overlay.

use emergency_map_emergency_models::evacuation::EvacuationCenter;

use crate::style::{evacuation_popup, evacuation_style};
use crate::surface::{MapSurface, MarkerId, MarkerLayer, MarkerSpec};

/// Owns the evacuation center markers on a surface.
#[derive(Debug, Default)]
pub struct EvacuationLayer {
    markers: Vec<MarkerId>,
}

impl EvacuationLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the drawn centers with `centers`.
    pub fn render(&mut self, surface: &mut dyn MapSurface, centers: &[EvacuationCenter]) {
        self.clear(surface);
        self.markers = centers
            .iter()
            .map(|center| {
                surface.add_marker(MarkerSpec {
                    layer: MarkerLayer::Evacuation,
                    position: center.location,
                    style: evacuation_style(center),
                    popup: evacuation_popup(center),
                })
            })
            .collect();
    }

    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        for id in self.markers.drain(..) {
            surface.remove_marker(id);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
