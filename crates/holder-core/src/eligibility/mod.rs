//! # Action Eligibility
//!
//! Pure predicates deciding, for a viewer role and a contract state, whether
//! an action may be performed and whether it should be shown at all.
//!
//! Two booleans are returned because several actions stay visible (as a
//! disabled control) in states where they cannot run yet.
//!
//! Rules, in evaluation order:
//! 1. a viewer who does not own the identity gets [`ActionEligibility::DENIED`]
//! 2. a sub-state absent for the action's phase gets `DENIED`
//! 3. every known sub-state maps to an explicit result
//! 4. an unrecognised sub-state reports through the [`DiagnosticSink`] and
//!    gets `DENIED`
//!
//! ```rust,ignore
//! let eligibility = evaluate(
//!     HolderAction::RestartReleaseIdentity,
//!     role,
//!     &snapshot.state,
//!     EligibilityFlags::from_state(&snapshot.state, now_ms),
//!     &TracingDiagnostics,
//! );
//! if eligibility.can_see_action {
//!     render_button(eligibility.can_perform);
//! }
//! ```

mod capture;
mod holding;
mod release;

pub use capture::{
    can_cancel_capture, can_confirm_holder_authn_method_registration,
    can_delete_protected_authn_method,
};
pub use holding::can_start_release;
pub use release::{
    can_confirm_owner_authn_method_registration, can_delete_holder_authn_method,
    can_restart_release_identity,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::DiagnosticSink;
use crate::state::{HolderPhase, IdentityHolderState};

// ============================================================================
// Viewer Role
// ============================================================================

/// Viewer-relative attributes; never stored in the contract snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewerRole {
    /// The authenticated viewer owns the held identity
    pub is_owned_by_current_user: bool,
    /// A viewer session is authenticated
    pub is_authenticated: bool,
}

impl ViewerRole {
    /// Authenticated owner
    pub const OWNER: Self = Self {
        is_owned_by_current_user: true,
        is_authenticated: true,
    };

    /// Authenticated viewer who is not the owner
    pub const OTHER: Self = Self {
        is_owned_by_current_user: false,
        is_authenticated: true,
    };

    /// Anonymous visitor
    pub const ANONYMOUS: Self = Self {
        is_owned_by_current_user: false,
        is_authenticated: false,
    };
}

// ============================================================================
// Actions
// ============================================================================

/// Owner actions gated by eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HolderAction {
    /// Abort an in-progress capture
    CancelCapture,
    /// Confirm the holder's authn-method session registration
    ConfirmHolderAuthnMethodRegistration,
    /// Remove a protected authn method the contract cannot delete itself
    DeleteProtectedAuthnMethod,
    /// Confirm the owner's new authn-method registration during release
    ConfirmOwnerAuthnMethodRegistration,
    /// Restart a stuck or failed release
    RestartReleaseIdentity,
    /// Retry removal of the holder authn method during release
    DeleteHolderAuthnMethod,
    /// Begin returning custody to the owner
    StartRelease,
}

impl HolderAction {
    /// Every action, in display order.
    pub const ALL: [HolderAction; 7] = [
        HolderAction::CancelCapture,
        HolderAction::ConfirmHolderAuthnMethodRegistration,
        HolderAction::DeleteProtectedAuthnMethod,
        HolderAction::StartRelease,
        HolderAction::ConfirmOwnerAuthnMethodRegistration,
        HolderAction::RestartReleaseIdentity,
        HolderAction::DeleteHolderAuthnMethod,
    ];

    /// Phase whose sub-state governs this action.
    pub fn governing_phase(&self) -> HolderPhase {
        match self {
            Self::CancelCapture
            | Self::ConfirmHolderAuthnMethodRegistration
            | Self::DeleteProtectedAuthnMethod => HolderPhase::Capture,
            Self::StartRelease => HolderPhase::Holding,
            Self::ConfirmOwnerAuthnMethodRegistration
            | Self::RestartReleaseIdentity
            | Self::DeleteHolderAuthnMethod => HolderPhase::Release,
        }
    }

    /// Wire-style name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CancelCapture => "cancelCapture",
            Self::ConfirmHolderAuthnMethodRegistration => "confirmHolderAuthnMethodRegistration",
            Self::DeleteProtectedAuthnMethod => "deleteProtectedAuthnMethod",
            Self::ConfirmOwnerAuthnMethodRegistration => "confirmOwnerAuthnMethodRegistration",
            Self::RestartReleaseIdentity => "restartReleaseIdentity",
            Self::DeleteHolderAuthnMethod => "deleteHolderAuthnMethod",
            Self::StartRelease => "startRelease",
        }
    }
}

impl fmt::Display for HolderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Results and inputs
// ============================================================================

/// Outcome of an eligibility predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActionEligibility {
    /// The action may be executed now
    pub can_perform: bool,
    /// The action should be rendered (possibly disabled)
    pub can_see_action: bool,
}

impl ActionEligibility {
    /// Hidden and not executable
    pub const DENIED: Self = Self {
        can_perform: false,
        can_see_action: false,
    };

    /// Shown but disabled
    pub const VISIBLE_ONLY: Self = Self {
        can_perform: false,
        can_see_action: true,
    };

    /// Shown and executable
    pub const ALLOWED: Self = Self {
        can_perform: true,
        can_see_action: true,
    };

    /// `ALLOWED` when `condition` holds, `DENIED` otherwise.
    pub fn allowed_if(condition: bool) -> Self {
        if condition {
            Self::ALLOWED
        } else {
            Self::DENIED
        }
    }

    /// Visible either way; executable only when `condition` holds.
    pub fn visible_enabled_if(condition: bool) -> Self {
        Self {
            can_perform: condition,
            can_see_action: true,
        }
    }
}

/// Auxiliary inputs derived from the snapshot and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EligibilityFlags {
    /// The contract's last background step failed
    pub has_processing_error: bool,
    /// Current time (ms since epoch)
    pub now_ms: u64,
}

impl EligibilityFlags {
    /// Derive flags from a state at `now_ms`.
    pub fn from_state(state: &IdentityHolderState, now_ms: u64) -> Self {
        Self {
            has_processing_error: state.has_processing_error(),
            now_ms,
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate one action against a state.
pub fn evaluate(
    action: HolderAction,
    role: ViewerRole,
    state: &IdentityHolderState,
    flags: EligibilityFlags,
    diagnostics: &dyn DiagnosticSink,
) -> ActionEligibility {
    match action {
        HolderAction::CancelCapture => {
            can_cancel_capture(role, state.capture_sub_state(), flags, diagnostics)
        }
        HolderAction::ConfirmHolderAuthnMethodRegistration => {
            can_confirm_holder_authn_method_registration(
                role,
                state.capture_sub_state(),
                diagnostics,
            )
        }
        HolderAction::DeleteProtectedAuthnMethod => {
            can_delete_protected_authn_method(role, state.capture_sub_state(), diagnostics)
        }
        HolderAction::StartRelease => {
            can_start_release(role, state.holding_sub_state(), flags, diagnostics)
        }
        HolderAction::ConfirmOwnerAuthnMethodRegistration => {
            can_confirm_owner_authn_method_registration(
                role,
                state.release_sub_state(),
                diagnostics,
            )
        }
        HolderAction::RestartReleaseIdentity => {
            can_restart_release_identity(role, state.release_sub_state(), diagnostics)
        }
        HolderAction::DeleteHolderAuthnMethod => {
            can_delete_holder_authn_method(role, state.release_sub_state(), flags, diagnostics)
        }
    }
}

/// Eligibility of every action for one state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EligibilityTable {
    entries: Vec<(HolderAction, ActionEligibility)>,
}

impl EligibilityTable {
    /// Eligibility of `action`; `DENIED` if absent.
    pub fn get(&self, action: HolderAction) -> ActionEligibility {
        self.entries
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, e)| *e)
            .unwrap_or(ActionEligibility::DENIED)
    }

    /// All entries in display order
    pub fn entries(&self) -> &[(HolderAction, ActionEligibility)] {
        &self.entries
    }

    /// Actions that should be rendered
    pub fn visible(&self) -> impl Iterator<Item = (HolderAction, ActionEligibility)> + '_ {
        self.entries
            .iter()
            .copied()
            .filter(|(_, e)| e.can_see_action)
    }
}

/// Evaluate every [`HolderAction`] against a state.
pub fn permitted_actions(
    role: ViewerRole,
    state: &IdentityHolderState,
    flags: EligibilityFlags,
    diagnostics: &dyn DiagnosticSink,
) -> EligibilityTable {
    EligibilityTable {
        entries: HolderAction::ALL
            .iter()
            .map(|action| (*action, evaluate(*action, role, state, flags, diagnostics)))
            .collect(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use crate::diagnostics::DiagnosticSink;
    use crate::state::*;

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) unhandled: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        pub(crate) fn unhandled_count(&self) -> usize {
            self.unhandled.lock().unwrap().len()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn unhandled_variant(&self, context: &'static str, variant: &str) {
            self.unhandled
                .lock()
                .unwrap()
                .push((context.to_string(), variant.to_string()));
        }

        fn caught_error(&self, _context: &'static str, _message: &str) {}
    }

    pub(crate) fn all_capture_sub_states() -> Vec<CaptureSubState> {
        vec![
            CaptureSubState::StartCapture,
            CaptureSubState::CreateEcdsaKey,
            CaptureSubState::RegisterAuthnMethodSession,
            CaptureSubState::NeedConfirmAuthnMethodSessionRegistration {
                confirmation_code: "code".to_string(),
                expiration_ms: 1_000,
            },
            CaptureSubState::ObtainingIdentityAuthnMethods,
            CaptureSubState::DeletingIdentityAuthnMethods,
            CaptureSubState::NeedDeleteProtectedIdentityAuthnMethod {
                public_key: "pk".to_string(),
            },
            CaptureSubState::ExitAndRegisterHolderAuthnMethod,
            CaptureSubState::FinishCapture,
            CaptureSubState::GetHolderContractPrincipal,
            CaptureSubState::CaptureFailed {
                error: CaptureFailure::SessionRegistrationModeExpired,
            },
        ]
    }

    pub(crate) fn all_holding_sub_states() -> Vec<HoldingSubState> {
        vec![
            HoldingSubState::Hold {
                quarantine_until_ms: None,
                sale_deal_in_progress: false,
            },
            HoldingSubState::StartFetchAssets,
            HoldingSubState::FetchAssets,
            HoldingSubState::FinishFetchAssets,
            HoldingSubState::ValidateAssets,
            HoldingSubState::Unsellable {
                reason: UnsellableReason::CertificateExpired,
            },
        ]
    }

    pub(crate) fn all_release_sub_states() -> Vec<ReleaseSubState> {
        vec![
            ReleaseSubState::StartRelease,
            ReleaseSubState::CheckingAccessFromOwnerAuthnMethod,
            ReleaseSubState::EnterAuthnMethodRegistrationMode,
            ReleaseSubState::WaitingAuthnMethodRegistration {
                expiration_ms: 1_000,
            },
            ReleaseSubState::ConfirmAuthnMethodRegistration {
                verification_code: "code".to_string(),
            },
            ReleaseSubState::DeleteHolderAuthnMethod,
            ReleaseSubState::EnsureOrphanedRegistrationExited,
            ReleaseSubState::DangerousToLoseIdentity,
            ReleaseSubState::IdentityApiChanged,
            ReleaseSubState::ReleaseFailed {
                error: ReleaseFailure::RegistrationModeExpired,
            },
        ]
    }

    pub(crate) fn all_states() -> Vec<IdentityHolderState> {
        let mut states = vec![
            IdentityHolderState::WaitingActivation,
            IdentityHolderState::Closed,
        ];
        for processing_error in [
            None,
            Some(ProcessingError {
                message: "failed".to_string(),
                time_ms: 1,
            }),
        ] {
            states.extend(all_capture_sub_states().into_iter().map(|sub_state| {
                IdentityHolderState::Capture {
                    sub_state,
                    processing_error: processing_error.clone(),
                }
            }));
            states.extend(all_holding_sub_states().into_iter().map(|sub_state| {
                IdentityHolderState::Holding {
                    sub_state,
                    processing_error: processing_error.clone(),
                }
            }));
            states.extend(all_release_sub_states().into_iter().map(|sub_state| {
                IdentityHolderState::Release {
                    sub_state,
                    processing_error: processing_error.clone(),
                }
            }));
        }
        states
    }
}
