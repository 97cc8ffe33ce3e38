//! Release-phase actions.

use super::gated_dispatch;
use crate::app::HolderApp;
use crate::dispatch::{ActionHandle, ActionOutcome};
use crate::runtime_bridge::ConfirmRegistrationArgs;
use holder_core::HolderAction;
use std::sync::Arc;

/// Confirm the owner's new authn-method registration.
pub async fn confirm_owner_authn_method_registration(
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
        HolderAction::ConfirmOwnerAuthnMethodRegistration,
        move || async move { bridge.confirm_owner_authn_method_registration(args).await },
    )
    .await
}

/// Restart the release procedure.
pub async fn restart_release_identity(app: &HolderApp, handle: &ActionHandle) -> ActionOutcome {
    let bridge = Arc::clone(app.bridge());
    gated_dispatch(
        app,
        handle,
        HolderAction::RestartReleaseIdentity,
        move || async move { bridge.restart_release_identity().await },
    )
    .await
}

/// Retry removing the holder's authn method.
pub async fn delete_holder_authn_method(app: &HolderApp, handle: &ActionHandle) -> ActionOutcome {
    let bridge = Arc::clone(app.bridge());
    gated_dispatch(
        app,
        handle,
        HolderAction::DeleteHolderAuthnMethod,
        move || async move { bridge.delete_holder_authn_method().await },
    )
    .await
}
