//! View teardown signalling.
//!
//! A view owns a [`ViewLifecycle`]. Work that outlives a user action (a
//! refresh, a report event) runs through a [`LifecycleToken`], and its
//! result is dropped once the view has been torn down. The request itself
//! may still finish remotely.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Teardown signal for one view. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct ViewLifecycle {
    torn_down: Arc<watch::Sender<bool>>,
}

impl Default for ViewLifecycle {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            torn_down: Arc::new(tx),
        }
    }
}

impl ViewLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals teardown. Idempotent.
    pub fn teardown(&self) {
        self.torn_down.send_replace(true);
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        *self.torn_down.borrow()
    }

    #[must_use]
    pub fn token(&self) -> LifecycleToken {
        LifecycleToken {
            torn_down: self.torn_down.subscribe(),
        }
    }
}

/// Observer side of a [`ViewLifecycle`].
#[derive(Debug, Clone)]
pub struct LifecycleToken {
    torn_down: watch::Receiver<bool>,
}

impl LifecycleToken {
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        *self.torn_down.borrow()
    }

    /// Resolves once the view is torn down.
    pub async fn torn_down(&mut self) {
        // The sender lives as long as the lifecycle; a closed channel means
        // the view is gone too.
        let _ = self.torn_down.wait_for(|torn| *torn).await;
    }

    /// Runs `work` unless the view is torn down first.
    ///
    /// Returns `None` if teardown happened before or during `work`.
    pub async fn guard<F: Future>(&mut self, work: F) -> Option<F::Output> {
        if self.is_torn_down() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.torn_down() => None,
            output = work => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn guard_passes_result_through() {
        let lifecycle = ViewLifecycle::new();
        let mut token = lifecycle.token();
        assert_eq!(token.guard(async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_discards_in_flight_work() {
        let lifecycle = ViewLifecycle::new();
        let mut token = lifecycle.token();

        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        };
        let teardown = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            lifecycle.teardown();
        };

        let (result, ()) = tokio::join!(token.guard(slow), teardown);
        assert_eq!(result, None);
        assert!(token.is_torn_down());
    }

    #[tokio::test]
    async fn torn_down_token_skips_work() {
        let lifecycle = ViewLifecycle::new();
        lifecycle.teardown();
        lifecycle.teardown();

        let mut token = lifecycle.token();
        assert_eq!(token.guard(async { 1 }).await, None);
    }
}
