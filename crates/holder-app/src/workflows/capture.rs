//! Capture-phase actions.

use super::gated_dispatch;
use crate::app::HolderApp;
use crate::dispatch::{ActionHandle, ActionOutcome};
use crate::runtime_bridge::{ConfirmRegistrationArgs, DeleteProtectedArgs};
use holder_core::HolderAction;
use std::sync::Arc;

/// Abort the capture.
pub async fn cancel_capture(app: &HolderApp, handle: &ActionHandle) -> ActionOutcome {
    let bridge = Arc::clone(app.bridge());
    gated_dispatch(app, handle, HolderAction::CancelCapture, move || async move {
        bridge.cancel_capture().await
    })
    .await
}

/// Confirm the holder's session registration with the code shown by the
/// identity service.
pub async fn confirm_holder_authn_method_registration(
    app: &HolderApp,
    handle: &ActionHandle,
    confirmation_code: impl Into<String>,
) -> ActionOutcome {
    let bridge = Arc::clone(app.bridge());
    let args = ConfirmRegistrationArgs {
        confirmation_code: confirmation_code.into(),
    };
    gated_dispatch(
        app,
        handle,
        HolderAction::ConfirmHolderAuthnMethodRegistration,
        move || async move { bridge.confirm_holder_authn_method_registration(args).await },
    )
    .await
}

/// Remove the protected authn method identified by `public_key`.
pub async fn delete_protected_authn_method(
    app: &HolderApp,
    handle: &ActionHandle,
    public_key: impl Into<String>,
) -> ActionOutcome {
    let bridge = Arc::clone(app.bridge());
    let args = DeleteProtectedArgs {
        public_key: public_key.into(),
    };
    gated_dispatch(
        app,
        handle,
        HolderAction::DeleteProtectedAuthnMethod,
        move || async move { bridge.delete_protected_authn_method(args).await },
    )
    .await
}
