//! Release-phase predicates.

use super::{ActionEligibility, EligibilityFlags, ViewerRole};
use crate::diagnostics::DiagnosticSink;
use crate::state::ReleaseSubState;

/// Whether the owner may restart the release.
///
/// Visible but disabled while the owner is confirming a registration.
pub fn can_restart_release_identity(
    role: ViewerRole,
    sub_state: Option<&ReleaseSubState>,
    diagnostics: &dyn DiagnosticSink,
) -> ActionEligibility {
    if !role.is_owned_by_current_user {
        return ActionEligibility::DENIED;
    }
    let Some(sub_state) = sub_state else {
        return ActionEligibility::DENIED;
    };

    match sub_state {
        ReleaseSubState::CheckingAccessFromOwnerAuthnMethod
        | ReleaseSubState::WaitingAuthnMethodRegistration { .. }
        | ReleaseSubState::ReleaseFailed { .. } => ActionEligibility::ALLOWED,
        ReleaseSubState::ConfirmAuthnMethodRegistration { .. } => ActionEligibility::VISIBLE_ONLY,
        ReleaseSubState::StartRelease
        | ReleaseSubState::EnterAuthnMethodRegistrationMode
        | ReleaseSubState::DeleteHolderAuthnMethod
        | ReleaseSubState::EnsureOrphanedRegistrationExited
        | ReleaseSubState::DangerousToLoseIdentity
        | ReleaseSubState::IdentityApiChanged => ActionEligibility::DENIED,
        ReleaseSubState::Unknown => {
            diagnostics.unhandled_variant("can_restart_release_identity", sub_state.name());
            ActionEligibility::DENIED
        }
    }
}

/// Whether the owner may confirm their new authn-method registration.
///
/// Visible ahead of time while the contract waits for the registration.
pub fn can_confirm_owner_authn_method_registration(
    role: ViewerRole,
    sub_state: Option<&ReleaseSubState>,
    diagnostics: &dyn DiagnosticSink,
) -> ActionEligibility {
    if !role.is_owned_by_current_user {
        return ActionEligibility::DENIED;
    }
    let Some(sub_state) = sub_state else {
        return ActionEligibility::DENIED;
    };

    match sub_state {
        ReleaseSubState::ConfirmAuthnMethodRegistration { .. } => ActionEligibility::ALLOWED,
        ReleaseSubState::WaitingAuthnMethodRegistration { .. } => ActionEligibility::VISIBLE_ONLY,
        ReleaseSubState::StartRelease
        | ReleaseSubState::CheckingAccessFromOwnerAuthnMethod
        | ReleaseSubState::EnterAuthnMethodRegistrationMode
        | ReleaseSubState::DeleteHolderAuthnMethod
        | ReleaseSubState::EnsureOrphanedRegistrationExited
        | ReleaseSubState::DangerousToLoseIdentity
        | ReleaseSubState::IdentityApiChanged
        | ReleaseSubState::ReleaseFailed { .. } => ActionEligibility::DENIED,
        ReleaseSubState::Unknown => {
            diagnostics.unhandled_variant(
                "can_confirm_owner_authn_method_registration",
                sub_state.name(),
            );
            ActionEligibility::DENIED
        }
    }
}

/// Whether the owner may retry removal of the holder authn method.
///
/// Shown throughout `DeleteHolderAuthnMethod`, enabled only after the
/// contract's own attempt failed.
pub fn can_delete_holder_authn_method(
    role: ViewerRole,
    sub_state: Option<&ReleaseSubState>,
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
        ReleaseSubState::DeleteHolderAuthnMethod => {
            ActionEligibility::visible_enabled_if(flags.has_processing_error)
        }
        ReleaseSubState::StartRelease
        | ReleaseSubState::CheckingAccessFromOwnerAuthnMethod
        | ReleaseSubState::EnterAuthnMethodRegistrationMode
        | ReleaseSubState::WaitingAuthnMethodRegistration { .. }
        | ReleaseSubState::ConfirmAuthnMethodRegistration { .. }
        | ReleaseSubState::EnsureOrphanedRegistrationExited
        | ReleaseSubState::DangerousToLoseIdentity
        | ReleaseSubState::IdentityApiChanged
        | ReleaseSubState::ReleaseFailed { .. } => ActionEligibility::DENIED,
        ReleaseSubState::Unknown => {
            diagnostics.unhandled_variant("can_delete_holder_authn_method", sub_state.name());
            ActionEligibility::DENIED
        }
    }
}
