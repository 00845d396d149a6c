#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency map view state.
//!
//! The view keeps one versioned [`RecordSet`] and one [`FilterState`].
//! Whenever either changes, the [`MarkerSynchronizer`] rebuilds the
//! markers on the [`MapSurface`] so they always match exactly the records
//! whose category is active. Drawing itself is left to the surface.

pub mod evacuation;
pub mod filter;
pub mod lifecycle;
pub mod records;
pub mod style;
pub mod surface;
pub mod sync;
pub mod view;

pub use evacuation::EvacuationLayer;
pub use filter::FilterState;
pub use lifecycle::{LifecycleToken, ViewLifecycle};
pub use records::{RecordSet, RecordStats};
pub use surface::{InMemorySurface, MapSurface, MarkerId, MarkerLayer, MarkerSpec};
pub use sync::MarkerSynchronizer;
pub use view::EmergencyView;
