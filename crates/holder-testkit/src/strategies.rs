//! Property test strategies for holder types
//!
//! Sub-state strategies cover every known variant; the `Unknown` variants are
//! left out so properties about defined behavior do not trip the fallback.
//!
//! ```rust,ignore
//! use holder_testkit::strategies::{arb_role, arb_state};
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn prop_visible_if_performable(role in arb_role(), state in arb_state()) {
//!         // ...
//!     }
//! }
//! ```

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use holder_core::{
    CaptureFailure, CaptureSubState, CertificateInfo, HolderAction, HolderSnapshot,
    HoldingSubState, IdentityHolderState, ProcessingError, ReleaseFailure, ReleaseSubState,
    UnsellableReason, ViewerRole,
};

/// Any of the seven owner actions
pub fn arb_action() -> impl Strategy<Value = HolderAction> {
    proptest::sample::select(HolderAction::ALL.to_vec())
}

/// Owner, other or anonymous
pub fn arb_role() -> impl Strategy<Value = ViewerRole> {
    prop_oneof![
        Just(ViewerRole::OWNER),
        Just(ViewerRole::OTHER),
        Just(ViewerRole::ANONYMOUS),
    ]
}

/// Any known capture sub-state
pub fn arb_capture_sub_state() -> impl Strategy<Value = CaptureSubState> {
    let failure = prop_oneof![
        Just(CaptureFailure::SessionRegistrationModeExpired),
        Just(CaptureFailure::SessionRegistrationModeOff),
        Just(CaptureFailure::SessionRegistrationAlreadyConfirmed),
        "[a-z]{1,12}".prop_map(CaptureFailure::InvalidMetadata),
    ];
    prop_oneof![
        Just(CaptureSubState::StartCapture),
        Just(CaptureSubState::CreateEcdsaKey),
        Just(CaptureSubState::RegisterAuthnMethodSession),
        ("[A-Z0-9]{6}", any::<u64>()).prop_map(|(confirmation_code, expiration_ms)| {
            CaptureSubState::NeedConfirmAuthnMethodSessionRegistration {
                confirmation_code,
                expiration_ms,
            }
        }),
        Just(CaptureSubState::ObtainingIdentityAuthnMethods),
        Just(CaptureSubState::DeletingIdentityAuthnMethods),
        "[a-f0-9]{16}".prop_map(|public_key| {
            CaptureSubState::NeedDeleteProtectedIdentityAuthnMethod { public_key }
        }),
        Just(CaptureSubState::ExitAndRegisterHolderAuthnMethod),
        Just(CaptureSubState::FinishCapture),
        Just(CaptureSubState::GetHolderContractPrincipal),
        failure.prop_map(|error| CaptureSubState::CaptureFailed { error }),
    ]
}

/// Any known holding sub-state
pub fn arb_holding_sub_state() -> impl Strategy<Value = HoldingSubState> {
    prop_oneof![
        (proptest::option::of(any::<u64>()), any::<bool>()).prop_map(
            |(quarantine_until_ms, sale_deal_in_progress)| HoldingSubState::Hold {
                quarantine_until_ms,
                sale_deal_in_progress,
            }
        ),
        Just(HoldingSubState::StartFetchAssets),
        Just(HoldingSubState::FetchAssets),
        Just(HoldingSubState::FinishFetchAssets),
        Just(HoldingSubState::ValidateAssets),
        prop_oneof![
            Just(UnsellableReason::CertificateExpired),
            Just(UnsellableReason::ValidationFailed),
            Just(UnsellableReason::ApiChanged),
        ]
        .prop_map(|reason| HoldingSubState::Unsellable { reason }),
    ]
}

/// Any known release sub-state
pub fn arb_release_sub_state() -> impl Strategy<Value = ReleaseSubState> {
    let failure = prop_oneof![
        Just(ReleaseFailure::RegistrationModeExpired),
        Just(ReleaseFailure::UnexpectedAuthnMethod),
        "[a-z]{1,12}".prop_map(ReleaseFailure::IdentityCallFailed),
    ];
    prop_oneof![
        Just(ReleaseSubState::StartRelease),
        Just(ReleaseSubState::CheckingAccessFromOwnerAuthnMethod),
        Just(ReleaseSubState::EnterAuthnMethodRegistrationMode),
        any::<u64>().prop_map(|expiration_ms| ReleaseSubState::WaitingAuthnMethodRegistration {
            expiration_ms
        }),
        "[0-9]{4,6}".prop_map(|verification_code| {
            ReleaseSubState::ConfirmAuthnMethodRegistration { verification_code }
        }),
        Just(ReleaseSubState::DeleteHolderAuthnMethod),
        Just(ReleaseSubState::EnsureOrphanedRegistrationExited),
        Just(ReleaseSubState::DangerousToLoseIdentity),
        Just(ReleaseSubState::IdentityApiChanged),
        failure.prop_map(|error| ReleaseSubState::ReleaseFailed { error }),
    ]
}

fn arb_processing_error() -> impl Strategy<Value = Option<ProcessingError>> {
    proptest::option::of(
        ("[a-z ]{1,24}", any::<u64>())
            .prop_map(|(message, time_ms)| ProcessingError { message, time_ms }),
    )
}

/// Any known lifecycle state
pub fn arb_state() -> impl Strategy<Value = IdentityHolderState> {
    prop_oneof![
        Just(IdentityHolderState::WaitingActivation),
        (arb_capture_sub_state(), arb_processing_error()).prop_map(
            |(sub_state, processing_error)| IdentityHolderState::Capture {
                sub_state,
                processing_error,
            }
        ),
        (arb_holding_sub_state(), arb_processing_error()).prop_map(
            |(sub_state, processing_error)| IdentityHolderState::Holding {
                sub_state,
                processing_error,
            }
        ),
        (arb_release_sub_state(), arb_processing_error()).prop_map(
            |(sub_state, processing_error)| IdentityHolderState::Release {
                sub_state,
                processing_error,
            }
        ),
        Just(IdentityHolderState::Closed),
    ]
}

/// Owner snapshot with an optional certificate
pub fn arb_snapshot() -> impl Strategy<Value = HolderSnapshot> {
    (
        arb_state(),
        proptest::option::of(any::<u64>()),
        any::<bool>(),
    )
        .prop_map(|(state, expiration, sale_completed)| {
            let mut snapshot = crate::fixtures::snapshot(state);
            snapshot.certificate = expiration.map(|expiration_ms| CertificateInfo {
                expiration_ms,
                unsellable_deadline_ms: None,
            });
            snapshot.sale_completed = sale_completed;
            snapshot
        })
}
