#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Notification side-effect for committed emergency reports.
//!
//! After a report has been written to the store, a short `{address, type}`
//! summary is posted to an external webhook. Delivery is best effort: the
//! [`NotificationDispatcher`] runs it on a background task and only logs
//! failures, so a lost notification never affects the committed record.

pub mod webhook;

use std::sync::Arc;

use emergency_map_emergency_models::{Emergency, EmergencyType, OpenEnum};
use serde::Serialize;
use tokio::task::JoinHandle;

pub use webhook::WebhookNotifier;

/// Errors from notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed or returned a non-success status.
    #[error("Notification delivery failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Payload posted for each committed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Display address of the report.
    pub address: String,
    /// Emergency category.
    #[serde(rename = "type")]
    pub emergency_type: OpenEnum<EmergencyType>,
}

impl From<&Emergency> for ReportSummary {
    fn from(record: &Emergency) -> Self {
        Self {
            address: record.address.clone(),
            emergency_type: record.emergency_type.clone(),
        }
    }
}

/// Outbound alert channel.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one summary.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if delivery fails.
    async fn notify(&self, summary: &ReportSummary) -> Result<(), NotifyError>;
}

/// A [`Notifier`] that drops every summary.
///
/// Used when the webhook service is disabled and in offline runs.
pub struct NullNotifier;

#[async_trait::async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, summary: &ReportSummary) -> Result<(), NotifyError> {
        log::debug!(
            "Notification disabled; dropping {} report at {}",
            summary.emergency_type,
            summary.address
        );
        Ok(())
    }
}

/// Fires notifications without blocking the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher delivering through `notifier`.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Creates a dispatcher that drops everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullNotifier))
    }

    /// Spawns delivery of `summary` on the current runtime.
    ///
    /// Failures are logged and swallowed. The returned handle resolves to
    /// `true` if the notification was delivered; awaiting it is optional.
    pub fn dispatch(&self, summary: ReportSummary) -> JoinHandle<bool> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.notify(&summary).await {
                Ok(()) => {
                    log::info!(
                        "Notified webhook of {} report at {}",
                        summary.emergency_type,
                        summary.address
                    );
                    true
                }
                Err(e) => {
                    log::warn!(
                        "Failed to notify webhook of {} report at {}: {e}",
                        summary.emergency_type,
                        summary.address
                    );
                    false
                }
            }
        })
    }
}
