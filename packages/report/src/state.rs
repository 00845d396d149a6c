//! Submission lifecycle states.

use std::fmt;
use std::sync::Arc;

use emergency_map_geolocation::LocationError;
use emergency_map_store::StoreError;

/// Why a submission ended up in [`SubmissionState::Failed`].
#[derive(Debug, Clone)]
pub enum FailureReason {
    /// The reporter's location could not be resolved. Submission may still
    /// be possible depending on the location policy.
    Location(LocationError),
    /// Fetching or writing the collection failed. The draft is kept.
    Store(Arc<StoreError>),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

/// Where a submission is in its lifecycle.
#[derive(Debug, Clone, Default)]
pub enum SubmissionState {
    /// No report form open.
    #[default]
    Idle,
    /// Waiting for a position fix.
    LocationPending,
    /// Waiting for the reverse geocoder.
    AddressPending,
    /// Location and address resolved; waiting for the reporter.
    Ready,
    /// Store round-trip in progress.
    Submitting,
    /// Record written; the form closes and the state returns to idle.
    Committed,
    /// Location or store failure; see the reason.
    Failed(FailureReason),
}

impl SubmissionState {
    /// Whether a submit action is accepted in this state.
    #[must_use]
    pub const fn accepts_submit(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    /// Short state name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LocationPending => "location-pending",
            Self::AddressPending => "address-pending",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Committed => "committed",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}
