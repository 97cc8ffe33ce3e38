//! Per-slot dispatch wrapper.

use super::feature::ActionFeature;
use super::single_flight::SingleFlight;
use crate::errors::{ActionError, BridgeError};
use crate::provider::HolderStateProvider;
use crate::session::Session;
use holder_core::{ContractId, DiagnosticSink, Dynamic, HolderAction, Subscription};
use std::future::Future;
use std::sync::Arc;

/// Outcome of one dispatch
pub type ActionOutcome = Result<(), ActionError>;

/// Coalescing key: one logical action on one contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    /// Target contract
    pub contract: ContractId,
    /// Action
    pub action: HolderAction,
}

/// Process-wide registry of in-flight actions.
///
/// Share one registry between every [`ActionHandle`] so independently
/// created handles for the same key coalesce.
pub type DispatchRegistry = SingleFlight<DispatchKey, ActionOutcome>;

/// One UI slot for an action: a dispatcher plus its observable
/// [`ActionFeature`].
///
/// Each handle tracks its own feature; coalescing happens in the shared
/// [`DispatchRegistry`].
pub struct ActionHandle {
    key: DispatchKey,
    feature: Dynamic<ActionFeature>,
    registry: Arc<DispatchRegistry>,
    session: Session,
    refetch: Option<Arc<HolderStateProvider>>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ActionHandle {
    /// Create an idle handle
    pub fn new(
        key: DispatchKey,
        registry: Arc<DispatchRegistry>,
        session: Session,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            key,
            feature: Dynamic::new(ActionFeature::idle()),
            registry,
            session,
            refetch: None,
            diagnostics,
        }
    }

    /// Refetch `provider` after each successful dispatch this handle leads
    pub fn with_refetch(mut self, provider: Arc<HolderStateProvider>) -> Self {
        self.refetch = Some(provider);
        self
    }

    /// Action this handle dispatches
    pub fn action(&self) -> HolderAction {
        self.key.action
    }

    /// Coalescing key
    pub fn key(&self) -> &DispatchKey {
        &self.key
    }

    /// Current feature
    pub fn feature(&self) -> ActionFeature {
        self.feature.get()
    }

    /// Poll for feature changes
    pub fn subscribe(&self) -> Subscription<ActionFeature> {
        self.feature.subscribe()
    }

    /// Run `call` through the single-flight registry.
    ///
    /// A call already in flight for the same key is joined and `call` is
    /// never invoked. The remote call races the session's disconnect signal.
    /// Failures are returned and recorded in the feature; they are never
    /// raised past this point.
    ///
    /// After a success the snapshot is refetched inside the flight, so it
    /// runs once for every caller and still runs when the caller that
    /// started the flight was dropped. A refetch failure is recorded by the
    /// provider and leaves the reported success in place.
    ///
    /// Dropping the returned future before it completes leaves the feature
    /// failed with [`ActionError::Abandoned`].
    pub async fn dispatch<F, Fut>(&self, call: F) -> ActionOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), BridgeError>> + Send + 'static,
    {
        let slot = Slot::start(&self.feature);
        tracing::debug!(
            contract = %self.key.contract,
            action = %self.key.action,
            "action dispatch started"
        );

        let signal = self.session.disconnect_signal();
        let settle = Settle {
            key: self.key.clone(),
            refetch: self.refetch.clone(),
            diagnostics: Arc::clone(&self.diagnostics),
        };
        let flight = self
            .registry
            .run(self.key.clone(), move || {
                let call = call();
                async move {
                    let outcome = tokio::select! {
                        result = call => result.map_err(ActionError::from),
                        () = signal.disconnected() => Err(ActionError::Disconnected),
                    };
                    settle.run(outcome).await
                }
            })
            .await;

        slot.finish(&flight.value);
        tracing::debug!(
            contract = %self.key.contract,
            action = %self.key.action,
            joined = !flight.leader,
            ok = flight.value.is_ok(),
            "action dispatch finished"
        );
        flight.value
    }
}

/// Completion work done once per flight, by whichever caller drives it.
struct Settle {
    key: DispatchKey,
    refetch: Option<Arc<HolderStateProvider>>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Settle {
    async fn run(self, outcome: ActionOutcome) -> ActionOutcome {
        let contract = &self.key.contract;
        let action = self.key.action;

        match &outcome {
            Ok(()) => {
                tracing::info!(contract = %contract, action = %action, "action completed");
                if let Some(provider) = &self.refetch {
                    // Failure is recorded in the provider view.
                    let _ = provider.refetch().await;
                }
            }
            Err(err @ ActionError::Contract(_)) => {
                tracing::warn!(
                    contract = %contract,
                    action = %action,
                    error = %err,
                    "action rejected by contract"
                );
            }
            Err(ActionError::Disconnected) => {
                tracing::info!(
                    contract = %contract,
                    action = %action,
                    "action interrupted by disconnect"
                );
            }
            Err(err) => {
                tracing::error!(
                    contract = %contract,
                    action = %action,
                    error = %err,
                    "action failed"
                );
                self.diagnostics.caught_error("action_dispatch", &err.to_string());
            }
        }
        outcome
    }
}

/// Feature of one dispatch; marked abandoned if dropped before `finish`.
struct Slot<'a> {
    feature: &'a Dynamic<ActionFeature>,
    done: bool,
}

impl<'a> Slot<'a> {
    fn start(feature: &'a Dynamic<ActionFeature>) -> Self {
        feature.set(ActionFeature::started());
        Self {
            feature,
            done: false,
        }
    }

    fn finish(mut self, outcome: &ActionOutcome) {
        self.feature.set(ActionFeature::finished(outcome));
        self.done = true;
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.feature.set(ActionFeature::failed(ActionError::Abandoned));
        }
    }
}

impl std::fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandle")
            .field("key", &self.key)
            .field("feature", &self.feature.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ContractError;
    use assert_matches::assert_matches;
    use holder_core::{Principal, TracingDiagnostics};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct CountingSink {
        caught: Mutex<Vec<String>>,
    }

    impl DiagnosticSink for CountingSink {
        fn unhandled_variant(&self, _context: &'static str, _variant: &str) {}

        fn caught_error(&self, context: &'static str, _message: &str) {
            self.caught.lock().push(context.to_string());
        }
    }

    fn key(action: HolderAction) -> DispatchKey {
        DispatchKey {
            contract: ContractId::new("holder-1"),
            action,
        }
    }

    fn handle(registry: &Arc<DispatchRegistry>, session: &Session) -> ActionHandle {
        ActionHandle::new(
            key(HolderAction::RestartReleaseIdentity),
            Arc::clone(registry),
            session.clone(),
            Arc::new(TracingDiagnostics),
        )
    }

    #[tokio::test]
    async fn test_failure_then_success_lifecycle() {
        let registry = Arc::new(DispatchRegistry::new());
        let session = Session::signed_in(Principal::parse("owner-1").unwrap());
        let handle = handle(&registry, &session);
        assert_eq!(handle.feature(), ActionFeature::idle());

        let outcome = handle
            .dispatch(|| async {
                Err(BridgeError::Contract(ContractError::CriticalCyclesLevel {
                    critical_threshold_cycles: 10,
                }))
            })
            .await;
        assert_matches!(outcome, Err(ActionError::Contract(_)));

        let feature = handle.feature();
        assert!(!feature.status.in_progress);
        assert!(feature.status.loaded);
        assert!(feature.error.is_error);

        handle.dispatch(|| async { Ok(()) }).await.unwrap();
        let feature = handle.feature();
        assert!(feature.status.loaded);
        assert!(!feature.error.is_error);
        assert_eq!(feature.error.error, None);
    }

    #[tokio::test]
    async fn test_feature_in_progress_while_pending() {
        let registry = Arc::new(DispatchRegistry::new());
        let session = Session::signed_in(Principal::parse("owner-1").unwrap());
        let handle = Arc::new(handle(&registry, &session));
        let (release, gate) = oneshot::channel::<()>();

        let task = {
            let handle = Arc::clone(&handle);
            tokio::spawn(async move {
                handle
                    .dispatch(move || async move {
                        let _ = gate.await;
                        Ok(())
                    })
                    .await
            })
        };
        while !registry.is_in_flight(handle.key()) {
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.feature(), ActionFeature::started());

        let _ = release.send(());
        task.await.unwrap().unwrap();
        assert_eq!(handle.feature(), ActionFeature::succeeded());
    }

    #[tokio::test]
    async fn test_two_handles_coalesce() {
        let registry = Arc::new(DispatchRegistry::new());
        let session = Session::signed_in(Principal::parse("owner-1").unwrap());
        let first = handle(&registry, &session);
        let second = handle(&registry, &session);
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();

        let c1 = Arc::clone(&calls);
        let c2 = Arc::clone(&calls);
        let run_first = first.dispatch(move || async move {
            c1.fetch_add(1, Ordering::SeqCst);
            let _ = gate.await;
            Err(BridgeError::transport("connection reset"))
        });
        let run_second = async {
            while !registry.is_in_flight(second.key()) {
                tokio::task::yield_now().await;
            }
            let joined = second.dispatch(move || async move {
                c2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let releaser = async {
                while registry.waiters(second.key()) < 2 {
                    tokio::task::yield_now().await;
                }
                let _ = release.send(());
            };
            let (outcome, ()) = tokio::join!(joined, releaser);
            outcome
        };

        let (a, b) = tokio::join!(run_first, run_second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_matches!(a, Err(ActionError::Unexpected { .. }));
        assert!(first.feature().error.is_error);
        assert!(second.feature().error.is_error);
    }

    #[tokio::test]
    async fn test_disconnect_rejects_pending_dispatch() {
        let registry = Arc::new(DispatchRegistry::new());
        let session = Session::signed_in(Principal::parse("owner-1").unwrap());
        let handle = handle(&registry, &session);

        let pending = handle.dispatch(|| std::future::pending::<Result<(), BridgeError>>());
        let disconnect = async {
            while !registry.is_in_flight(handle.key()) {
                tokio::task::yield_now().await;
            }
            session.disconnect();
        };
        let (outcome, ()) = tokio::join!(pending, disconnect);

        assert_eq!(outcome, Err(ActionError::Disconnected));
        assert_eq!(
            handle.feature().last_error(),
            Some(&ActionError::Disconnected)
        );
        assert!(!registry.is_in_flight(handle.key()));
    }

    #[tokio::test]
    async fn test_unexpected_failure_reported_once() {
        let registry = Arc::new(DispatchRegistry::new());
        let session = Session::signed_in(Principal::parse("owner-1").unwrap());
        let sink = Arc::new(CountingSink::default());
        let handle = ActionHandle::new(
            key(HolderAction::CancelCapture),
            registry,
            session,
            Arc::clone(&sink) as Arc<dyn DiagnosticSink>,
        );

        let _ = handle
            .dispatch(|| async { Err(BridgeError::transport("boom")) })
            .await;
        assert_eq!(*sink.caught.lock(), vec!["action_dispatch".to_string()]);
    }

    #[tokio::test]
    async fn test_abandoned_leader_failure_reported_by_joiner() {
        let registry = Arc::new(DispatchRegistry::new());
        let session = Session::signed_in(Principal::parse("owner-1").unwrap());
        let sink = Arc::new(CountingSink::default());
        let make = || {
            ActionHandle::new(
                key(HolderAction::CancelCapture),
                Arc::clone(&registry),
                session.clone(),
                Arc::clone(&sink) as Arc<dyn DiagnosticSink>,
            )
        };
        let first = make();
        let second = make();
        let (release, gate) = oneshot::channel::<()>();

        {
            let mut started = Box::pin(first.dispatch(move || async move {
                let _ = gate.await;
                Err(BridgeError::transport("connection reset"))
            }));
            assert!(futures::poll!(started.as_mut()).is_pending());
        }
        assert_eq!(first.feature(), ActionFeature::failed(ActionError::Abandoned));
        assert!(registry.is_in_flight(first.key()));

        let _ = release.send(());
        let outcome = second
            .dispatch(|| async { Ok(()) })
            .await;

        assert_matches!(outcome, Err(ActionError::Unexpected { .. }));
        assert!(second.feature().error.is_error);
        assert_eq!(*sink.caught.lock(), vec!["action_dispatch".to_string()]);
        assert!(!registry.is_in_flight(first.key()));
    }
}
