//! # Workflows - Gated Contract Actions
//!
//! One function per owner action. Every workflow follows the same steps:
//!
//! 1. Evaluate eligibility against the current snapshot and viewer role
//! 2. Refuse with [`ActionError::NotPermitted`] unless `can_perform` holds;
//!    no remote call is made and the handle's feature is left untouched
//! 3. Dispatch the bridge call through the caller's [`ActionHandle`]
//!
//! ```rust,ignore
//! let handle = app.action(HolderAction::RestartReleaseIdentity);
//! match workflows::release::restart_release_identity(&app, &handle).await {
//!     Ok(()) => {}
//!     Err(err) => show(app.user_message(&err)),
//! }
//! ```

pub mod capture;
pub mod holding;
pub mod release;

use crate::app::HolderApp;
use crate::dispatch::{ActionHandle, ActionOutcome};
use crate::errors::{ActionError, BridgeError};
use holder_core::HolderAction;
use std::future::Future;

pub(crate) async fn gated_dispatch<F, Fut>(
    app: &HolderApp,
    handle: &ActionHandle,
    action: HolderAction,
    call: F,
) -> ActionOutcome
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), BridgeError>> + Send + 'static,
{
    if handle.action() != action {
        return Err(ActionError::unexpected(
            format!("handle for {} used to dispatch {action}", handle.action()),
            "workflow",
        ));
    }

    let eligibility = app.eligibility(action);
    if !eligibility.can_perform {
        tracing::warn!(
            contract = %app.contract(),
            action = %action,
            visible = eligibility.can_see_action,
            "action refused by eligibility"
        );
        return Err(ActionError::NotPermitted { action });
    }

    handle.dispatch(call).await
}
