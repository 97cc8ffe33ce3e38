//! Holding-phase predicates.

use super::{ActionEligibility, EligibilityFlags, ViewerRole};
use crate::diagnostics::DiagnosticSink;
use crate::state::HoldingSubState;

/// Whether the owner may start releasing the identity.
///
/// Only idle custody can be released. An open sale deal or an active
/// quarantine keeps the control visible but disabled.
pub fn can_start_release(
    role: ViewerRole,
    sub_state: Option<&HoldingSubState>,
    flags: EligibilityFlags,
    diagnostics: &dyn DiagnosticSink,
) -> ActionEligibility {
    if !role.is_owned_by_current_user {
        return ActionEligibility::DENIED;
    }
    let Some(sub_state) = sub_state else {
        return ActionEligibility::DENIED;
    };

    match sub_state {
        HoldingSubState::Hold {
            quarantine_until_ms,
            sale_deal_in_progress,
        } => {
            let quarantined = quarantine_until_ms.is_some_and(|until| flags.now_ms < until);
            ActionEligibility::visible_enabled_if(!quarantined && !*sale_deal_in_progress)
        }
        HoldingSubState::StartFetchAssets
        | HoldingSubState::FetchAssets
        | HoldingSubState::FinishFetchAssets
        | HoldingSubState::ValidateAssets
        | HoldingSubState::Unsellable { .. } => ActionEligibility::DENIED,
        HoldingSubState::Unknown => {
            diagnostics.unhandled_variant("can_start_release", sub_state.name());
            ActionEligibility::DENIED
        }
    }
}
