//! Eligibility as seen through the app: session role, snapshot, clock.

use assert_matches::assert_matches;
use holder_app::workflows::{capture, holding, release};
use holder_app::{ActionError, HolderApp, Session};
use holder_core::{
    evaluate, permitted_actions, ActionEligibility, CaptureSubState, ContractId, EligibilityFlags,
    HolderAction, HoldingSubState, ReleaseSubState, ViewerRole,
};
use holder_testkit::strategies::{arb_action, arb_role, arb_snapshot, arb_state};
use holder_testkit::{app_for, fixtures, MockHolderBridge, RecordingDiagnostics};
use proptest::prelude::*;
use std::sync::Arc;

#[tokio::test]
async fn restart_visible_but_refused_while_confirming() {
    let bridge = MockHolderBridge::with_snapshot(fixtures::release(
        ReleaseSubState::ConfirmAuthnMethodRegistration {
            verification_code: "918273".into(),
        },
    ));
    let test = app_for(&bridge, fixtures::owner());
    test.app.refresh().await.unwrap();

    assert_eq!(
        test.app.eligibility(HolderAction::RestartReleaseIdentity),
        ActionEligibility::VISIBLE_ONLY
    );

    let slot = test.app.action(HolderAction::RestartReleaseIdentity);
    assert_matches!(
        release::restart_release_identity(&test.app, &slot).await,
        Err(ActionError::NotPermitted {
            action: HolderAction::RestartReleaseIdentity
        })
    );
    assert_eq!(bridge.total_calls(), 0);

    // The confirm action is the one on offer here.
    let confirm = test.app.action(HolderAction::ConfirmOwnerAuthnMethodRegistration);
    release::confirm_owner_authn_method_registration(&test.app, &confirm, "918273")
        .await
        .unwrap();
    assert_eq!(bridge.confirmation_codes(), vec!["918273".to_string()]);
}

#[tokio::test]
async fn stranger_sees_nothing() {
    let bridge = MockHolderBridge::with_snapshot(fixtures::capture(CaptureSubState::CaptureFailed {
        error: holder_core::CaptureFailure::SessionRegistrationModeExpired,
    }));
    let test = app_for(&bridge, fixtures::stranger());
    test.app.refresh().await.unwrap();

    assert_eq!(test.app.role(), ViewerRole::OTHER);
    let table = test.app.permitted_actions().unwrap();
    assert_eq!(table.visible().count(), 0);

    let slot = test.app.action(HolderAction::CancelCapture);
    assert_matches!(
        capture::cancel_capture(&test.app, &slot).await,
        Err(ActionError::NotPermitted { .. })
    );
}

#[tokio::test]
async fn sign_in_as_owner_unlocks_actions() {
    let bridge = MockHolderBridge::with_snapshot(fixtures::capture(
        CaptureSubState::NeedDeleteProtectedIdentityAuthnMethod {
            public_key: "04ab".into(),
        },
    ));
    let test = app_for(&bridge, fixtures::stranger());
    test.app.refresh().await.unwrap();
    assert_eq!(
        test.app.eligibility(HolderAction::DeleteProtectedAuthnMethod),
        ActionEligibility::DENIED
    );

    test.app.session().sign_in(fixtures::owner());
    let slot = test.app.action(HolderAction::DeleteProtectedAuthnMethod);
    capture::delete_protected_authn_method(&test.app, &slot, "04ab")
        .await
        .unwrap();
    assert_eq!(bridge.deleted_keys(), vec!["04ab".to_string()]);
}

#[tokio::test]
async fn quarantine_expires_with_clock() {
    let bridge = MockHolderBridge::with_snapshot(fixtures::holding(HoldingSubState::Hold {
        quarantine_until_ms: Some(5_000),
        sale_deal_in_progress: false,
    }));
    let test = app_for(&bridge, fixtures::owner());
    test.app.refresh().await.unwrap();

    assert_eq!(
        test.app.eligibility(HolderAction::StartRelease),
        ActionEligibility::VISIBLE_ONLY
    );

    test.clock.set(5_000);
    let slot = test.app.action(HolderAction::StartRelease);
    holding::start_release(&test.app, &slot).await.unwrap();
    assert_eq!(bridge.calls(HolderAction::StartRelease), 1);
}

#[test]
fn unknown_sub_state_from_newer_contract_denies_and_reports() {
    let state: holder_core::IdentityHolderState = serde_json::from_str(
        r#"{ "state": "Capture", "sub_state": { "type": "SomeFutureStep" } }"#,
    )
    .unwrap();
    let diagnostics = RecordingDiagnostics::default();

    let table = permitted_actions(
        ViewerRole::OWNER,
        &state,
        EligibilityFlags::default(),
        &diagnostics,
    );
    assert_eq!(table.visible().count(), 0);
    assert_eq!(diagnostics.unhandled_count(), 3);
}

#[test]
fn app_without_snapshot_denies() {
    let app = HolderApp::builder(
        ContractId::new("holder-1"),
        Arc::new(MockHolderBridge::new()),
    )
    .session(Session::signed_in(fixtures::owner()))
    .build()
    .unwrap();
    assert_eq!(
        app.eligibility(HolderAction::CancelCapture),
        ActionEligibility::DENIED
    );
}

proptest! {
    #[test]
    fn prop_non_owner_never_permitted(
        action in arb_action(),
        state in arb_state(),
        authenticated in any::<bool>(),
        now_ms in any::<u64>(),
    ) {
        let diagnostics = RecordingDiagnostics::default();
        let role = ViewerRole { is_owned_by_current_user: false, is_authenticated: authenticated };
        let flags = EligibilityFlags::from_state(&state, now_ms);
        prop_assert_eq!(
            evaluate(action, role, &state, flags, &diagnostics),
            ActionEligibility::DENIED
        );
        prop_assert_eq!(diagnostics.unhandled_count(), 0);
    }

    #[test]
    fn prop_known_states_never_fall_back(
        role in arb_role(),
        snapshot in arb_snapshot(),
        now_ms in any::<u64>(),
    ) {
        let diagnostics = RecordingDiagnostics::default();
        let flags = EligibilityFlags::from_state(&snapshot.state, now_ms);
        let table = permitted_actions(role, &snapshot.state, flags, &diagnostics);
        prop_assert_eq!(table.entries().len(), HolderAction::ALL.len());
        for (_, eligibility) in table.entries() {
            prop_assert!(!eligibility.can_perform || eligibility.can_see_action);
        }
        prop_assert!(diagnostics.entries().is_empty());
    }
}
