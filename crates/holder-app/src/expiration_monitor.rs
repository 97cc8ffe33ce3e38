//! Recurring recomputation of the certificate status.
//!
//! The status is a pure function of the current snapshot and the clock; this
//! module only decides when to recompute and publishes the result.

use crate::clock::Clock;
use crate::config::ExpirationConfig;
use crate::provider::{HolderStateProvider, HolderStateView};
use holder_core::{
    compute_status_with, CertificateExpirationStatus, Dynamic, ExpirationInput, HolderPhase,
    HolderSnapshot, Subscription,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Status for `snapshot` at `now_ms`; `None` before a certificate exists.
pub fn status_for_snapshot(
    snapshot: &HolderSnapshot,
    now_ms: u64,
    config: &ExpirationConfig,
) -> Option<CertificateExpirationStatus> {
    let certificate = snapshot.certificate.as_ref()?;
    Some(compute_status_with(ExpirationInput::from_certificate(
        certificate,
        now_ms,
        config.safety_window_ms,
        config.unsellable_margin_ms,
        snapshot.sale_completed,
    )))
}

/// The status to show as a banner, if any.
///
/// Nothing is shown once the sale completed, during `Release` or `Closed`,
/// or while the certificate is valid.
pub fn banner_status(
    snapshot: &HolderSnapshot,
    status: Option<CertificateExpirationStatus>,
) -> Option<CertificateExpirationStatus> {
    if snapshot.sale_completed {
        return None;
    }
    match snapshot.phase() {
        HolderPhase::Release | HolderPhase::Closed => None,
        HolderPhase::WaitingActivation | HolderPhase::Capture | HolderPhase::Holding => {
            status.filter(CertificateExpirationStatus::needs_attention)
        }
    }
}

/// Publishes the certificate status of the provider's current snapshot.
pub struct ExpirationMonitor {
    view: Dynamic<HolderStateView>,
    status: Dynamic<Option<CertificateExpirationStatus>>,
    clock: Arc<dyn Clock>,
    config: ExpirationConfig,
}

impl ExpirationMonitor {
    /// Monitor `provider`'s snapshots. No status is published until the
    /// first [`tick`](Self::tick).
    pub fn new(
        provider: &HolderStateProvider,
        clock: Arc<dyn Clock>,
        config: ExpirationConfig,
    ) -> Self {
        Self {
            view: provider.view_cell(),
            status: Dynamic::new(None),
            clock,
            config,
        }
    }

    /// Last published status
    pub fn status(&self) -> Option<CertificateExpirationStatus> {
        self.status.get()
    }

    /// Poll for status changes
    pub fn subscribe(&self) -> Subscription<Option<CertificateExpirationStatus>> {
        self.status.subscribe()
    }

    /// Recompute now. Subscribers are notified only when the status changed.
    pub fn tick(&self) -> Option<CertificateExpirationStatus> {
        let now_ms = self.clock.now_ms();
        let next = self
            .view
            .get()
            .snapshot
            .and_then(|snapshot| status_for_snapshot(&snapshot, now_ms, &self.config));

        if self.status.get() != next {
            tracing::debug!(
                status = next.map_or("none", |s| s.label()),
                now_ms,
                "certificate status changed"
            );
            self.status.set(next);
        }
        next
    }

    /// Banner for the current snapshot and last published status
    pub fn banner(&self) -> Option<CertificateExpirationStatus> {
        let snapshot = self.view.get().snapshot?;
        banner_status(&snapshot, self.status.get())
    }

    /// Tick every `tick_interval_ms` on the current tokio runtime.
    ///
    /// The task stops when the returned [`MonitorTask`] is dropped.
    pub fn spawn(self: Arc<Self>) -> MonitorTask {
        let period = Duration::from_millis(self.config.tick_interval_ms.max(1));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.tick();
            }
        });
        MonitorTask { handle }
    }
}

impl std::fmt::Debug for ExpirationMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirationMonitor")
            .field("status", &self.status.get())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Running monitor task; aborted on drop.
#[derive(Debug)]
pub struct MonitorTask {
    handle: JoinHandle<()>,
}

impl MonitorTask {
    /// Stop ticking
    pub fn stop(self) {}

    /// Whether the task has ended
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for MonitorTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
