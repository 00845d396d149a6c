//! Display address composition.

use serde::Deserialize;

/// Address components returned by the reverse geocoder.
///
/// Only the fields used for display are kept; everything else in the
/// response is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressParts {
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl AddressParts {
    /// Joins road, suburb, city, state and country with `", "`, in that
    /// order, skipping absent or blank components.
    ///
    /// Returns `None` when none of them are present.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.road,
            &self.suburb,
            &self.city,
            &self.state,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
