//! In-crate test doubles.
//!
//! Unit tests cannot use holder-testkit types (it links its own copy of this
//! crate), so they share this stub instead.

use crate::errors::BridgeError;
use crate::runtime_bridge::{ConfirmRegistrationArgs, DeleteProtectedArgs, HolderBridge};
use async_trait::async_trait;
use holder_core::{HolderAction, HolderSnapshot};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Bridge with scripted fetches and recorded action calls.
#[derive(Default)]
pub(crate) struct StubBridge {
    fetches: Mutex<VecDeque<Result<HolderSnapshot, BridgeError>>>,
    calls: Mutex<Vec<HolderAction>>,
    action_error: Mutex<Option<BridgeError>>,
}

impl StubBridge {
    pub(crate) fn push_fetch(&self, result: Result<HolderSnapshot, BridgeError>) {
        self.fetches.lock().push_back(result);
    }

    pub(crate) fn fail_actions_with(&self, error: BridgeError) {
        *self.action_error.lock() = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<HolderAction> {
        self.calls.lock().clone()
    }

    fn record(&self, action: HolderAction) -> Result<(), BridgeError> {
        self.calls.lock().push(action);
        match self.action_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HolderBridge for StubBridge {
    async fn fetch_holder_state(&self) -> Result<HolderSnapshot, BridgeError> {
        self.fetches
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(BridgeError::transport("no scripted snapshot")))
    }

    async fn cancel_capture(&self) -> Result<(), BridgeError> {
        self.record(HolderAction::CancelCapture)
    }

    async fn confirm_holder_authn_method_registration(
        &self,
        _args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError> {
        self.record(HolderAction::ConfirmHolderAuthnMethodRegistration)
    }

    async fn delete_protected_authn_method(
        &self,
        _args: DeleteProtectedArgs,
    ) -> Result<(), BridgeError> {
        self.record(HolderAction::DeleteProtectedAuthnMethod)
    }

    async fn start_release(&self) -> Result<(), BridgeError> {
        self.record(HolderAction::StartRelease)
    }

    async fn confirm_owner_authn_method_registration(
        &self,
        _args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError> {
        self.record(HolderAction::ConfirmOwnerAuthnMethodRegistration)
    }

    async fn restart_release_identity(&self) -> Result<(), BridgeError> {
        self.record(HolderAction::RestartReleaseIdentity)
    }

    async fn delete_holder_authn_method(&self) -> Result<(), BridgeError> {
        self.record(HolderAction::DeleteHolderAuthnMethod)
    }
}
