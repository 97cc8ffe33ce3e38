//! Action dispatch against the mock contract.

use assert_matches::assert_matches;
use holder_app::workflows::release::restart_release_identity;
use holder_app::{ActionError, ActionFeature, BridgeError, ContractError, Delay, HolderApp};
use holder_core::{HolderAction, HolderPhase, ReleaseSubState};
use holder_testkit::{app_for, fixtures, MockHolderBridge, TestApp};
use std::time::Duration;

fn release_app(sub_state: ReleaseSubState) -> (MockHolderBridge, TestApp) {
    holder_testkit::init_tracing();
    let bridge = MockHolderBridge::with_snapshot(fixtures::release(sub_state));
    let test = app_for(&bridge, fixtures::owner());
    (bridge, test)
}

async fn loaded(app: &HolderApp) {
    app.refresh().await.unwrap();
}

#[tokio::test]
async fn concurrent_dispatches_make_one_remote_call() {
    let (bridge, test) = release_app(ReleaseSubState::ReleaseFailed {
        error: holder_core::ReleaseFailure::RegistrationModeExpired,
    });
    loaded(&test.app).await;
    let gate = bridge.gate(HolderAction::RestartReleaseIdentity);

    // Two independently created slots for the same action.
    let first = test.app.action(HolderAction::RestartReleaseIdentity);
    let second = test.app.action(HolderAction::RestartReleaseIdentity);
    let registry = test.app.registry();

    let opener = async {
        while registry.waiters(first.key()) < 2 {
            tokio::task::yield_now().await;
        }
        gate.open();
    };
    let (a, b, ()) = tokio::join!(
        restart_release_identity(&test.app, &first),
        restart_release_identity(&test.app, &second),
        opener
    );

    assert_eq!(bridge.calls(HolderAction::RestartReleaseIdentity), 1);
    assert_eq!(a, Ok(()));
    assert_eq!(a, b);
    assert_eq!(first.feature(), ActionFeature::succeeded());
    assert_eq!(second.feature(), ActionFeature::succeeded());
}

#[tokio::test]
async fn retry_while_in_progress_joins_pending_call() {
    let (bridge, test) = release_app(ReleaseSubState::CheckingAccessFromOwnerAuthnMethod);
    loaded(&test.app).await;
    bridge.delay(HolderAction::RestartReleaseIdentity, Duration::from_millis(50));

    let slot = test.app.action(HolderAction::RestartReleaseIdentity);
    let (a, b) = tokio::join!(
        restart_release_identity(&test.app, &slot),
        restart_release_identity(&test.app, &slot)
    );

    assert_eq!(a, b);
    assert_eq!(bridge.calls(HolderAction::RestartReleaseIdentity), 1);
}

#[tokio::test]
async fn failed_then_successful_dispatch_updates_feature() {
    let (bridge, test) = release_app(ReleaseSubState::WaitingAuthnMethodRegistration {
        expiration_ms: 10_000,
    });
    loaded(&test.app).await;
    bridge.respond(
        HolderAction::RestartReleaseIdentity,
        Err(BridgeError::Contract(ContractError::AddControllerDelay {
            delay: Delay { time: 3_600_000 },
        })),
    );
    let slot = test.app.action(HolderAction::RestartReleaseIdentity);

    let err = restart_release_identity(&test.app, &slot)
        .await
        .unwrap_err();
    let feature = slot.feature();
    assert!(!feature.status.in_progress);
    assert!(feature.status.loaded);
    assert!(feature.error.is_error);
    assert_eq!(
        test.app.user_message(&err),
        "Delay required: try again in 1h."
    );

    restart_release_identity(&test.app, &slot).await.unwrap();
    let feature = slot.feature();
    assert!(feature.status.loaded);
    assert!(!feature.error.is_error);
    assert_eq!(bridge.calls(HolderAction::RestartReleaseIdentity), 2);
}

#[tokio::test]
async fn success_refetches_snapshot() {
    let (bridge, test) = release_app(ReleaseSubState::ReleaseFailed {
        error: holder_core::ReleaseFailure::UnexpectedAuthnMethod,
    });
    loaded(&test.app).await;
    bridge.transition_on(
        HolderAction::RestartReleaseIdentity,
        fixtures::release(ReleaseSubState::StartRelease),
    );
    let mut updates = test.app.provider().subscribe();

    let slot = test.app.action(HolderAction::RestartReleaseIdentity);
    restart_release_identity(&test.app, &slot).await.unwrap();

    assert_eq!(bridge.fetches(), 2);
    let view = updates.poll().unwrap();
    let snapshot = view.snapshot.unwrap();
    assert_eq!(snapshot.phase(), HolderPhase::Release);
    assert_eq!(snapshot.state.sub_state_name(), Some("StartRelease"));
}

#[tokio::test]
async fn refetch_failure_keeps_action_success() {
    let (bridge, test) = release_app(ReleaseSubState::CheckingAccessFromOwnerAuthnMethod);
    loaded(&test.app).await;
    bridge.fail_next_fetch(BridgeError::transport("gateway timeout"));

    let slot = test.app.action(HolderAction::RestartReleaseIdentity);
    restart_release_identity(&test.app, &slot).await.unwrap();

    assert_eq!(slot.feature(), ActionFeature::succeeded());
    let view = test.app.provider().view();
    assert!(view.snapshot.is_some());
    assert!(view.last_error.is_some());
    assert_eq!(
        test.diagnostics
            .caught_count("holder_state_provider::refetch"),
        1
    );
}

#[tokio::test]
async fn transport_failure_is_generic_and_reported() {
    let (bridge, test) = release_app(ReleaseSubState::CheckingAccessFromOwnerAuthnMethod);
    loaded(&test.app).await;
    bridge.respond(
        HolderAction::RestartReleaseIdentity,
        Err(BridgeError::transport("replica returned 503")),
    );

    let slot = test.app.action(HolderAction::RestartReleaseIdentity);
    let err = restart_release_identity(&test.app, &slot)
        .await
        .unwrap_err();

    assert_matches!(err, ActionError::Unexpected { .. });
    assert_eq!(test.app.user_message(&err), "Unable to complete action");
    assert_eq!(test.diagnostics.caught_count("action_dispatch"), 1);
}

#[tokio::test]
async fn disconnect_rejects_in_flight_action() {
    let (bridge, test) = release_app(ReleaseSubState::CheckingAccessFromOwnerAuthnMethod);
    loaded(&test.app).await;
    let _gate = bridge.gate(HolderAction::RestartReleaseIdentity);

    let slot = test.app.action(HolderAction::RestartReleaseIdentity);
    let disconnect = async {
        while bridge.calls(HolderAction::RestartReleaseIdentity) == 0 {
            tokio::task::yield_now().await;
        }
        test.app.session().disconnect();
    };
    let (outcome, ()) = tokio::join!(restart_release_identity(&test.app, &slot), disconnect);

    assert_eq!(outcome, Err(ActionError::Disconnected));
    assert_eq!(slot.feature().last_error(), Some(&ActionError::Disconnected));
    assert!(!test.app.registry().is_in_flight(slot.key()));
}

#[tokio::test]
async fn abandoned_dispatch_still_refetches_when_joined() {
    let (bridge, test) = release_app(ReleaseSubState::CheckingAccessFromOwnerAuthnMethod);
    loaded(&test.app).await;
    let gate = bridge.gate(HolderAction::RestartReleaseIdentity);
    bridge.transition_on(
        HolderAction::RestartReleaseIdentity,
        fixtures::release(ReleaseSubState::StartRelease),
    );
    let first = test.app.action(HolderAction::RestartReleaseIdentity);
    let second = test.app.action(HolderAction::RestartReleaseIdentity);

    // Started, then dropped mid-call.
    {
        let mut started = Box::pin(restart_release_identity(&test.app, &first));
        assert!(futures::poll!(started.as_mut()).is_pending());
    }
    assert_eq!(bridge.calls(HolderAction::RestartReleaseIdentity), 1);
    assert!(test.app.registry().is_in_flight(first.key()));
    assert!(!first.feature().in_progress());
    assert_eq!(first.feature().last_error(), Some(&ActionError::Abandoned));

    gate.open();
    restart_release_identity(&test.app, &second).await.unwrap();

    assert_eq!(bridge.calls(HolderAction::RestartReleaseIdentity), 1);
    assert_eq!(bridge.fetches(), 2);
    let snapshot = test.app.snapshot().unwrap();
    assert_eq!(snapshot.state.sub_state_name(), Some("StartRelease"));
    assert_eq!(second.feature(), ActionFeature::succeeded());
}
