//! The in-progress report.

use chrono::{DateTime, Utc};
use emergency_map_emergency_models::{
    Coordinates, Emergency, EmergencyType, Severity, UNKNOWN_LOCATION,
};

use crate::ValidationError;

/// What to do when the reporter's location could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationPolicy {
    /// Block submission until coordinates are known.
    #[default]
    Required,
    /// Submit at the given point with an unknown address.
    FallbackTo(Coordinates),
}

/// Transient form state for one report. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionDraft {
    /// Selected category.
    pub emergency_type: Option<EmergencyType>,
    /// Free-text details.
    pub details: String,
    /// Resolved coordinates, once known.
    pub coordinates: Option<Coordinates>,
    /// Resolved display address, once known.
    pub address: Option<String>,
}

impl SubmissionDraft {
    /// Checks the form gate: a type is selected, details are non-blank,
    /// and a location is available under `policy`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, policy: LocationPolicy) -> Result<(), ValidationError> {
        if self.emergency_type.is_none() {
            return Err(ValidationError::MissingType);
        }
        if self.details.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if self.coordinates.is_none() && policy == LocationPolicy::Required {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    /// Builds the record to append, stamped with `timestamp`.
    ///
    /// User reports are always [`Severity::REPORTED`]. Without resolved
    /// coordinates the record is placed at the policy's fallback point and
    /// its address is [`UNKNOWN_LOCATION`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the draft does not pass
    /// [`Self::validate`].
    pub fn to_record(
        &self,
        policy: LocationPolicy,
        reported_by: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Emergency, ValidationError> {
        self.validate(policy)?;

        let emergency_type = self.emergency_type.ok_or(ValidationError::MissingType)?;
        let (location, address) = match (self.coordinates, policy) {
            (Some(coords), _) => (
                coords,
                self.address
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            ),
            (None, LocationPolicy::FallbackTo(fallback)) => {
                (fallback, UNKNOWN_LOCATION.to_string())
            }
            (None, LocationPolicy::Required) => return Err(ValidationError::MissingLocation),
        };

        Ok(Emergency {
            emergency_type: emergency_type.into(),
            location,
            address,
            severity: Severity::REPORTED.into(),
            description: self.details.trim().to_string(),
            timestamp,
            reported_by,
        })
    }
}
