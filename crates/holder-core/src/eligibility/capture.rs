//! Capture-phase predicates.

use super::{ActionEligibility, EligibilityFlags, ViewerRole};
use crate::diagnostics::DiagnosticSink;
use crate::state::CaptureSubState;

/// Whether the owner may cancel the capture.
///
/// `ExitAndRegisterHolderAuthnMethod` shows the control but never enables it.
pub fn can_cancel_capture(
    role: ViewerRole,
    sub_state: Option<&CaptureSubState>,
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
        CaptureSubState::NeedConfirmAuthnMethodSessionRegistration { .. }
        | CaptureSubState::CaptureFailed { .. } => ActionEligibility::ALLOWED,
        CaptureSubState::StartCapture
        | CaptureSubState::CreateEcdsaKey
        | CaptureSubState::RegisterAuthnMethodSession => {
            ActionEligibility::allowed_if(flags.has_processing_error)
        }
        CaptureSubState::ExitAndRegisterHolderAuthnMethod => ActionEligibility::VISIBLE_ONLY,
        CaptureSubState::ObtainingIdentityAuthnMethods
        | CaptureSubState::DeletingIdentityAuthnMethods
        | CaptureSubState::NeedDeleteProtectedIdentityAuthnMethod { .. }
        | CaptureSubState::FinishCapture
        | CaptureSubState::GetHolderContractPrincipal => ActionEligibility::DENIED,
        CaptureSubState::Unknown => {
            diagnostics.unhandled_variant("can_cancel_capture", sub_state.name());
            ActionEligibility::DENIED
        }
    }
}

/// Whether the owner may confirm the holder's session registration.
pub fn can_confirm_holder_authn_method_registration(
    role: ViewerRole,
    sub_state: Option<&CaptureSubState>,
    diagnostics: &dyn DiagnosticSink,
) -> ActionEligibility {
    if !role.is_owned_by_current_user {
        return ActionEligibility::DENIED;
    }
    let Some(sub_state) = sub_state else {
        return ActionEligibility::DENIED;
    };

    match sub_state {
        CaptureSubState::NeedConfirmAuthnMethodSessionRegistration { .. } => {
            ActionEligibility::ALLOWED
        }
        CaptureSubState::StartCapture
        | CaptureSubState::CreateEcdsaKey
        | CaptureSubState::RegisterAuthnMethodSession
        | CaptureSubState::ObtainingIdentityAuthnMethods
        | CaptureSubState::DeletingIdentityAuthnMethods
        | CaptureSubState::NeedDeleteProtectedIdentityAuthnMethod { .. }
        | CaptureSubState::ExitAndRegisterHolderAuthnMethod
        | CaptureSubState::FinishCapture
        | CaptureSubState::GetHolderContractPrincipal
        | CaptureSubState::CaptureFailed { .. } => ActionEligibility::DENIED,
        CaptureSubState::Unknown => {
            diagnostics.unhandled_variant(
                "can_confirm_holder_authn_method_registration",
                sub_state.name(),
            );
            ActionEligibility::DENIED
        }
    }
}

/// Whether the owner may delete the protected authn method blocking capture.
pub fn can_delete_protected_authn_method(
    role: ViewerRole,
    sub_state: Option<&CaptureSubState>,
    diagnostics: &dyn DiagnosticSink,
) -> ActionEligibility {
    if !role.is_owned_by_current_user {
        return ActionEligibility::DENIED;
    }
    let Some(sub_state) = sub_state else {
        return ActionEligibility::DENIED;
    };

    match sub_state {
        CaptureSubState::NeedDeleteProtectedIdentityAuthnMethod { .. } => {
            ActionEligibility::ALLOWED
        }
        CaptureSubState::StartCapture
        | CaptureSubState::CreateEcdsaKey
        | CaptureSubState::RegisterAuthnMethodSession
        | CaptureSubState::NeedConfirmAuthnMethodSessionRegistration { .. }
        | CaptureSubState::ObtainingIdentityAuthnMethods
        | CaptureSubState::DeletingIdentityAuthnMethods
        | CaptureSubState::ExitAndRegisterHolderAuthnMethod
        | CaptureSubState::FinishCapture
        | CaptureSubState::GetHolderContractPrincipal
        | CaptureSubState::CaptureFailed { .. } => ActionEligibility::DENIED,
        CaptureSubState::Unknown => {
            diagnostics.unhandled_variant("can_delete_protected_authn_method", sub_state.name());
            ActionEligibility::DENIED
        }
    }
}
