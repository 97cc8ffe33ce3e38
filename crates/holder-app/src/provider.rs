//! Snapshot provider
//!
//! Owns the current [`HolderSnapshot`] of one contract. Consumers read it
//! through [`HolderStateView`] and poll for replacements with
//! [`HolderStateProvider::subscribe`]. A snapshot is only ever replaced
//! wholesale by a successful refetch.

use crate::errors::BridgeError;
use crate::runtime_bridge::HolderBridge;
use holder_core::{ContractId, DiagnosticSink, Dynamic, HolderError, HolderSnapshot, Subscription};
use std::sync::Arc;

/// What consumers see of the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolderStateView {
    /// Last successfully fetched snapshot
    pub snapshot: Option<Arc<HolderSnapshot>>,
    /// Failure of the most recent fetch, cleared by the next success
    pub last_error: Option<HolderError>,
    /// A fetch is running
    pub refreshing: bool,
}

impl HolderStateView {
    /// A snapshot has been loaded at least once
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Nothing to render: no snapshot and the last fetch failed
    pub fn is_unavailable(&self) -> bool {
        self.snapshot.is_none() && self.last_error.is_some()
    }
}

/// Fetches and publishes holder snapshots.
pub struct HolderStateProvider {
    contract: ContractId,
    bridge: Arc<dyn HolderBridge>,
    view: Dynamic<HolderStateView>,
    // Serializes fetches so a slower, older read never overwrites a newer one.
    fetch_lock: async_lock::Mutex<()>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl HolderStateProvider {
    /// Create a provider with no snapshot loaded
    pub fn new(
        contract: ContractId,
        bridge: Arc<dyn HolderBridge>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            contract,
            bridge,
            view: Dynamic::new(HolderStateView::default()),
            fetch_lock: async_lock::Mutex::new(()),
            diagnostics,
        }
    }

    /// Contract this provider reads
    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// Current view
    pub fn view(&self) -> HolderStateView {
        self.view.get()
    }

    /// Current snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<HolderSnapshot>> {
        self.view.get().snapshot
    }

    /// Poll for view changes
    pub fn subscribe(&self) -> Subscription<HolderStateView> {
        self.view.subscribe()
    }

    pub(crate) fn view_cell(&self) -> Dynamic<HolderStateView> {
        self.view.clone()
    }

    /// Fetch the snapshot and publish it.
    ///
    /// On failure the previous snapshot stays in place and the error is
    /// recorded in [`HolderStateView::last_error`].
    pub async fn refetch(&self) -> Result<Arc<HolderSnapshot>, HolderError> {
        let _guard = self.fetch_lock.lock().await;

        self.view.update(|v| HolderStateView {
            refreshing: true,
            ..v.clone()
        });

        match self.bridge.fetch_holder_state().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                tracing::debug!(
                    contract = %self.contract,
                    state = %snapshot.state,
                    "holder snapshot refreshed"
                );
                self.view.set(HolderStateView {
                    snapshot: Some(Arc::clone(&snapshot)),
                    last_error: None,
                    refreshing: false,
                });
                Ok(snapshot)
            }
            Err(err) => {
                let err = fetch_error(err);
                tracing::warn!(
                    contract = %self.contract,
                    error = %err,
                    "holder snapshot refresh failed"
                );
                self.diagnostics
                    .caught_error("holder_state_provider::refetch", &err.to_string());
                self.view.update(|v| HolderStateView {
                    snapshot: v.snapshot.clone(),
                    last_error: Some(err.clone()),
                    refreshing: false,
                });
                Err(err)
            }
        }
    }

    /// Publish a snapshot obtained elsewhere.
    pub fn replace(&self, snapshot: HolderSnapshot) {
        self.view.set(HolderStateView {
            snapshot: Some(Arc::new(snapshot)),
            last_error: None,
            refreshing: false,
        });
    }
}

impl std::fmt::Debug for HolderStateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolderStateProvider")
            .field("contract", &self.contract)
            .field("view", &self.view.get())
            .finish_non_exhaustive()
    }
}

fn fetch_error(err: BridgeError) -> HolderError {
    match err {
        BridgeError::Contract(e) => HolderError::unavailable(e.to_string()),
        BridgeError::Transport { message } => HolderError::network(message),
    }
}
