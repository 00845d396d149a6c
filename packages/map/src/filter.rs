//! Category filter toggles.

use emergency_map_emergency_models::{Emergency, EmergencyType};

/// One category chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCategory {
    pub id: EmergencyType,
    pub active: bool,
}

/// The set of category toggles gating which records are shown.
///
/// Every category starts active. A record is in the effective view set
/// when its category is active; records with an unrecognized category
/// match no toggle and are never shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    categories: Vec<FilterCategory>,
    generation: u64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            categories: EmergencyType::all()
                .iter()
                .map(|&id| FilterCategory { id, active: true })
                .collect(),
            generation: 0,
        }
    }
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with only `active` enabled.
    #[must_use]
    pub fn only(active: &[EmergencyType]) -> Self {
        let mut state = Self::default();
        for category in &mut state.categories {
            category.active = active.contains(&category.id);
        }
        state
    }

    /// Flips one category and returns its new state.
    pub fn toggle(&mut self, id: EmergencyType) -> bool {
        self.generation += 1;
        match self.categories.iter_mut().find(|c| c.id == id) {
            Some(category) => {
                category.active = !category.active;
                category.active
            }
            None => {
                self.categories.push(FilterCategory { id, active: true });
                true
            }
        }
    }

    #[must_use]
    pub fn is_active(&self, id: EmergencyType) -> bool {
        self.categories.iter().any(|c| c.id == id && c.active)
    }

    #[must_use]
    pub fn categories(&self) -> &[FilterCategory] {
        &self.categories
    }

    /// Active category ids, in display order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<EmergencyType> {
        self.categories
            .iter()
            .filter(|c| c.active)
            .map(|c| c.id)
            .collect()
    }

    /// Whether `record` is in the effective view set: a known, active
    /// category at a position that can be drawn.
    #[must_use]
    pub fn admits(&self, record: &Emergency) -> bool {
        record.location.is_valid() && record.known_type().is_some_and(|id| self.is_active(id))
    }

    /// Number of records in the effective view set.
    #[must_use]
    pub fn active_count(&self, records: &[Emergency]) -> usize {
        records.iter().filter(|r| self.admits(r)).count()
    }

    /// Number of records of category `id`, active or not.
    #[must_use]
    pub fn count_by_category(records: &[Emergency], id: EmergencyType) -> usize {
        records.iter().filter(|r| r.known_type() == Some(id)).count()
    }

    /// Bumped on every toggle.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}
