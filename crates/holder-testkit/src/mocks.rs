//! Mock implementation of `HolderBridge`
//!
//! The mock holds a scripted contract snapshot and answers action calls from
//! per-action response queues (default `Ok`). A successful call can move the
//! scripted snapshot to a follow-up state, so refetch-after-action flows can
//! be observed end to end.

use async_trait::async_trait;
use holder_app::{BridgeError, ConfirmRegistrationArgs, DeleteProtectedArgs, HolderBridge};
use holder_core::{HolderAction, HolderSnapshot};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Blocks calls until opened. Clones share the same gate.
#[derive(Debug, Clone)]
pub struct Gate {
    open: Arc<watch::Sender<bool>>,
}

impl Gate {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { open: Arc::new(tx) }
    }

    /// Release every waiting and future call
    pub fn open(&self) {
        self.open.send_replace(true);
    }

    async fn wait(&self) {
        let mut rx = self.open.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

#[derive(Default)]
struct MockState {
    snapshot: Mutex<Option<HolderSnapshot>>,
    fetch_failures: Mutex<VecDeque<BridgeError>>,
    fetches: AtomicUsize,
    calls: Mutex<HashMap<HolderAction, usize>>,
    responses: Mutex<HashMap<HolderAction, VecDeque<Result<(), BridgeError>>>>,
    transitions: Mutex<HashMap<HolderAction, HolderSnapshot>>,
    gates: Mutex<HashMap<HolderAction, Gate>>,
    delays: Mutex<HashMap<HolderAction, Duration>>,
    confirmation_codes: Mutex<Vec<String>>,
    deleted_keys: Mutex<Vec<String>>,
}

/// Scripted holder contract. Clones share state.
#[derive(Clone, Default)]
pub struct MockHolderBridge {
    state: Arc<MockState>,
}

impl MockHolderBridge {
    /// Mock with no snapshot; fetches fail until one is set
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock serving `snapshot`
    pub fn with_snapshot(snapshot: HolderSnapshot) -> Self {
        let mock = Self::new();
        mock.set_snapshot(snapshot);
        mock
    }

    /// Replace the served snapshot
    pub fn set_snapshot(&self, snapshot: HolderSnapshot) {
        *self.state.snapshot.lock() = Some(snapshot);
    }

    /// Fail the next fetch with `error`
    pub fn fail_next_fetch(&self, error: BridgeError) {
        self.state.fetch_failures.lock().push_back(error);
    }

    /// Answer the next call of `action` with `result`
    pub fn respond(&self, action: HolderAction, result: Result<(), BridgeError>) {
        self.state
            .responses
            .lock()
            .entry(action)
            .or_default()
            .push_back(result);
    }

    /// Serve `snapshot` after each successful call of `action`
    pub fn transition_on(&self, action: HolderAction, snapshot: HolderSnapshot) {
        self.state.transitions.lock().insert(action, snapshot);
    }

    /// Hold calls of `action` until the returned gate opens
    pub fn gate(&self, action: HolderAction) -> Gate {
        let gate = Gate::new();
        self.state.gates.lock().insert(action, gate.clone());
        gate
    }

    /// Delay calls of `action` by `delay`
    pub fn delay(&self, action: HolderAction, delay: Duration) {
        self.state.delays.lock().insert(action, delay);
    }

    /// Calls of `action` so far, counted when the call starts
    pub fn calls(&self, action: HolderAction) -> usize {
        self.state.calls.lock().get(&action).copied().unwrap_or(0)
    }

    /// Calls of every action so far
    pub fn total_calls(&self) -> usize {
        self.state.calls.lock().values().sum()
    }

    /// Fetches so far
    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    /// Codes passed to either confirm call
    pub fn confirmation_codes(&self) -> Vec<String> {
        self.state.confirmation_codes.lock().clone()
    }

    /// Keys passed to `delete_protected_authn_method`
    pub fn deleted_keys(&self) -> Vec<String> {
        self.state.deleted_keys.lock().clone()
    }

    async fn perform(&self, action: HolderAction) -> Result<(), BridgeError> {
        *self.state.calls.lock().entry(action).or_default() += 1;
        tracing::debug!(action = %action, "mock bridge call");

        let gate = self.state.gates.lock().get(&action).cloned();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        let delay = self.state.delays.lock().get(&action).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = self
            .state
            .responses
            .lock()
            .get_mut(&action)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(()));

        if result.is_ok() {
            let next = self.state.transitions.lock().get(&action).cloned();
            if let Some(next) = next {
                self.set_snapshot(next);
            }
        }
        result
    }
}

#[async_trait]
impl HolderBridge for MockHolderBridge {
    async fn fetch_holder_state(&self) -> Result<HolderSnapshot, BridgeError> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.state.fetch_failures.lock().pop_front() {
            return Err(error);
        }
        self.state
            .snapshot
            .lock()
            .clone()
            .ok_or_else(|| BridgeError::transport("mock has no snapshot"))
    }

    async fn cancel_capture(&self) -> Result<(), BridgeError> {
        self.perform(HolderAction::CancelCapture).await
    }

    async fn confirm_holder_authn_method_registration(
        &self,
        args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError> {
        self.state
            .confirmation_codes
            .lock()
            .push(args.confirmation_code);
        self.perform(HolderAction::ConfirmHolderAuthnMethodRegistration)
            .await
    }

    async fn delete_protected_authn_method(
        &self,
        args: DeleteProtectedArgs,
    ) -> Result<(), BridgeError> {
        self.state.deleted_keys.lock().push(args.public_key);
        self.perform(HolderAction::DeleteProtectedAuthnMethod).await
    }

    async fn start_release(&self) -> Result<(), BridgeError> {
        self.perform(HolderAction::StartRelease).await
    }

    async fn confirm_owner_authn_method_registration(
        &self,
        args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError> {
        self.state
            .confirmation_codes
            .lock()
            .push(args.confirmation_code);
        self.perform(HolderAction::ConfirmOwnerAuthnMethodRegistration)
            .await
    }

    async fn restart_release_identity(&self) -> Result<(), BridgeError> {
        self.perform(HolderAction::RestartReleaseIdentity).await
    }

    async fn delete_holder_authn_method(&self) -> Result<(), BridgeError> {
        self.perform(HolderAction::DeleteHolderAuthnMethod).await
    }
}

impl std::fmt::Debug for MockHolderBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHolderBridge")
            .field("fetches", &self.fetches())
            .field("total_calls", &self.total_calls())
            .finish_non_exhaustive()
    }
}
