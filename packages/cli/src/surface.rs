//! Terminal rendering of the map.

use emergency_map_map::{InMemorySurface, MapSurface, MarkerId, MarkerLayer, MarkerSpec};

/// Prints each marker as it is drawn.
///
/// Markers are rebuilt on every sync, so each refresh prints the full
/// effective view.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    inner: InMemorySurface,
    quiet: bool,
}

impl TerminalSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps markers without printing them.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    pub fn print(&self) {
        for (_, spec) in self.inner.markers() {
            print_marker(spec);
        }
    }

    #[must_use]
    pub fn count(&self, layer: MarkerLayer) -> usize {
        self.inner.layer(layer).count()
    }
}

impl MapSurface for TerminalSurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        if !self.quiet {
            print_marker(&spec);
        }
        self.inner.add_marker(spec)
    }

    fn remove_marker(&mut self, id: MarkerId) -> bool {
        self.inner.remove_marker(id)
    }

    fn dispose(&mut self) {
        self.inner.dispose();
    }
}

fn print_marker(spec: &MarkerSpec) {
    println!("{} @ {}", spec.popup.title, spec.position);
    for line in &spec.popup.lines {
        println!("    {line}");
    }
}
