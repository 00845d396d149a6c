//! The emergency map view.

use std::sync::Arc;
use std::time::Duration;

use emergency_map_emergency_models::evacuation::EvacuationCenter;
use emergency_map_emergency_models::{Emergency, EmergencyType};
use emergency_map_report::ReportEvent;
use emergency_map_store::EmergencyStore;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;

use crate::evacuation::EvacuationLayer;
use crate::filter::FilterState;
use crate::lifecycle::{LifecycleToken, ViewLifecycle};
use crate::records::RecordSet;
use crate::surface::MapSurface;
use crate::sync::MarkerSynchronizer;

/// Record list, filter toggles and the markers drawn from them.
pub struct EmergencyView<S: MapSurface> {
    surface: S,
    store: Arc<dyn EmergencyStore>,
    records: RecordSet,
    filter: FilterState,
    markers: MarkerSynchronizer,
    evacuation: EvacuationLayer,
    lifecycle: ViewLifecycle,
    token: LifecycleToken,
    disposed: bool,
}

impl<S: MapSurface> EmergencyView<S> {
    /// Creates an empty view drawing on `surface` and reading from `store`.
    #[must_use]
    pub fn new(surface: S, store: Arc<dyn EmergencyStore>) -> Self {
        let lifecycle = ViewLifecycle::new();
        let token = lifecycle.token();
        Self {
            surface,
            store,
            records: RecordSet::new(),
            filter: FilterState::new(),
            markers: MarkerSynchronizer::new(),
            evacuation: EvacuationLayer::new(),
            lifecycle,
            token,
            disposed: false,
        }
    }

    /// Starts with a custom filter.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn records(&self) -> &RecordSet {
        &self.records
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub const fn markers(&self) -> &MarkerSynchronizer {
        &self.markers
    }

    /// A handle that can tear this view down from elsewhere.
    #[must_use]
    pub fn lifecycle(&self) -> ViewLifecycle {
        self.lifecycle.clone()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.lifecycle.is_torn_down()
    }

    /// Replaces the record list and re-syncs markers.
    pub fn apply_records(&mut self, records: Vec<Emergency>) {
        if self.finish_if_torn_down() {
            return;
        }
        self.records.replace(records);
        self.markers
            .sync_if_changed(&mut self.surface, &self.records, &self.filter);
    }

    /// Flips one category filter, re-syncs markers and returns the new
    /// state of the category.
    pub fn toggle_filter(&mut self, id: EmergencyType) -> bool {
        let active = self.filter.toggle(id);
        if !self.finish_if_torn_down() {
            self.markers
                .sync_if_changed(&mut self.surface, &self.records, &self.filter);
        }
        active
    }

    /// Draws the evacuation center overlay.
    pub fn show_evacuation_centers(&mut self, centers: &[EvacuationCenter]) {
        if !self.finish_if_torn_down() {
            self.evacuation.render(&mut self.surface, centers);
        }
    }

    /// Reloads the record list from the store.
    ///
    /// A failed fetch empties the list instead of keeping stale markers.
    /// If the view is torn down while the fetch is in flight, the result
    /// is dropped.
    pub async fn refresh(&mut self) {
        let store = Arc::clone(&self.store);
        let Some(result) = self.token.guard(store.fetch_all()).await else {
            log::debug!("View torn down; discarding refresh");
            self.finish_if_torn_down();
            return;
        };

        let records = match result {
            Ok(collection) => {
                let records = collection.to_records();
                log::info!("Loaded {} emergencies", records.len());
                records
            }
            Err(e) => {
                log::error!("{e}");
                Vec::new()
            }
        };
        self.apply_records(records);
    }

    /// Reacts to a report event from a coordinator.
    pub async fn handle_event(&mut self, event: ReportEvent) {
        match event {
            ReportEvent::Submitted(record) => {
                log::debug!(
                    "Refreshing after {} report at {}",
                    record.emergency_type,
                    record.address
                );
                self.refresh().await;
            }
        }
    }

    /// Keeps the view current until it is torn down.
    ///
    /// Refreshes on every report event and, if `interval` is set, on every
    /// tick. Without an interval the loop also ends when every event
    /// sender is gone. The surface is disposed before returning.
    pub async fn run(
        &mut self,
        mut events: broadcast::Receiver<ReportEvent>,
        interval: Option<Duration>,
    ) {
        let mut ticker = interval.map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut events_open = true;
        let mut token = self.lifecycle.token();

        loop {
            if !events_open && ticker.is_none() {
                break;
            }
            tokio::select! {
                biased;
                () = token.torn_down() => break,
                event = events.recv(), if events_open => match event {
                    Ok(event) => self.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Missed {skipped} report events; refreshing");
                        self.refresh().await;
                    }
                    Err(RecvError::Closed) => events_open = false,
                },
                _ = tick(ticker.as_mut()), if ticker.is_some() => self.refresh().await,
            }
        }

        self.teardown();
    }

    /// Tears the view down: drops all markers and disposes the surface.
    pub fn teardown(&mut self) {
        self.lifecycle.teardown();
        self.finish_if_torn_down();
    }

    /// Releases the surface once teardown has been signalled. Returns
    /// whether the view is torn down.
    fn finish_if_torn_down(&mut self) -> bool {
        if !self.lifecycle.is_torn_down() {
            return false;
        }
        if !self.disposed {
            self.markers.clear(&mut self.surface);
            self.evacuation.clear(&mut self.surface);
            self.surface.dispose();
            self.disposed = true;
            log::debug!("Map view disposed");
        }
        true
    }
}

async fn tick(ticker: Option<&mut tokio::time::Interval>) {
    if let Some(ticker) = ticker {
        ticker.tick().await;
    }
}
