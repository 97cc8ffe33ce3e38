//! Holding-phase actions.

use super::gated_dispatch;
use crate::app::HolderApp;
use crate::dispatch::{ActionHandle, ActionOutcome};
use holder_core::HolderAction;
use std::sync::Arc;

/// Start releasing the identity back to its owner.
pub async fn start_release(app: &HolderApp, handle: &ActionHandle) -> ActionOutcome {
    let bridge = Arc::clone(app.bridge());
    gated_dispatch(app, handle, HolderAction::StartRelease, move || async move {
        bridge.start_release().await
    })
    .await
}
