#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency report submission.
//!
//! A [`ReportCoordinator`] owns one report from the moment the report form
//! opens until it is committed or closed:
//!
//! 1. resolve the reporter's location (failure is recorded, not fatal),
//! 2. reverse geocode it (failure falls back to a placeholder address),
//! 3. on submit, fetch the shared collection, append, and write it back,
//! 4. fire the webhook notification and emit [`ReportEvent::Submitted`].
//!
//! Side effects are strictly ordered: nothing is written unless the fetch
//! succeeded, and nothing is notified unless the write succeeded. Store
//! failures keep the draft so the reporter can retry.

pub mod coordinator;
pub mod draft;
pub mod state;

use std::sync::Arc;

use emergency_map_emergency_models::Emergency;
use emergency_map_store::StoreError;

pub use coordinator::{ReportCoordinator, SubmissionReceipt};
pub use draft::{LocationPolicy, SubmissionDraft};
pub use state::{FailureReason, SubmissionState};

/// Why a draft cannot be submitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No emergency type selected.
    #[error("Select an emergency type")]
    MissingType,

    /// Details are empty.
    #[error("Describe the emergency")]
    MissingDescription,

    /// No coordinates and the policy requires them.
    #[error("Location is required to submit a report")]
    MissingLocation,
}

/// Errors returned by [`ReportCoordinator::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The report form is not open.
    #[error("No report is open")]
    NotOpen,

    /// The draft failed validation; nothing was sent.
    #[error("Report is incomplete: {0}")]
    Invalid(#[from] ValidationError),

    /// Fetching or writing the collection failed; the draft is kept.
    #[error("Report could not be saved: {0}")]
    Store(Arc<StoreError>),
}

/// Events emitted to the coordinator's host.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A report was committed to the store.
    Submitted(Emergency),
}
