//! # HolderApp
//!
//! Wires one contract's collaborators together: the bridge, the snapshot
//! provider, the viewer session, the dispatch registry, the clock and the
//! diagnostic sink. Frontends hold one `HolderApp` per displayed contract
//! and share one [`DispatchRegistry`] between them.

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::dispatch::{ActionHandle, DispatchKey, DispatchRegistry};
use crate::errors::ActionError;
use crate::expiration_monitor::ExpirationMonitor;
use crate::provider::HolderStateProvider;
use crate::runtime_bridge::HolderBridge;
use crate::session::Session;
use holder_core::{
    evaluate, permitted_actions, ActionEligibility, ContractId, DiagnosticSink,
    EligibilityFlags, EligibilityTable, HolderAction, HolderError, HolderSnapshot,
    TracingDiagnostics, ViewerRole,
};
use std::sync::Arc;

/// Builder for [`HolderApp`].
pub struct HolderAppBuilder {
    contract: ContractId,
    bridge: Arc<dyn HolderBridge>,
    config: AppConfig,
    session: Option<Session>,
    registry: Option<Arc<DispatchRegistry>>,
    clock: Option<Arc<dyn Clock>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl HolderAppBuilder {
    /// Use `config` instead of the defaults
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing session
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Share a dispatch registry with other apps
    pub fn registry(mut self, registry: Arc<DispatchRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the system clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the tracing diagnostic sink
    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Validate the configuration and build.
    pub fn build(self) -> Result<HolderApp, HolderError> {
        self.config.validate()?;

        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingDiagnostics));
        let provider = Arc::new(HolderStateProvider::new(
            self.contract.clone(),
            Arc::clone(&self.bridge),
            Arc::clone(&diagnostics),
        ));

        Ok(HolderApp {
            contract: self.contract,
            config: self.config,
            bridge: self.bridge,
            provider,
            session: self.session.unwrap_or_default(),
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(DispatchRegistry::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            diagnostics,
        })
    }
}

/// Application core for one holder contract.
pub struct HolderApp {
    contract: ContractId,
    config: AppConfig,
    bridge: Arc<dyn HolderBridge>,
    provider: Arc<HolderStateProvider>,
    session: Session,
    registry: Arc<DispatchRegistry>,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl HolderApp {
    /// Start building an app for `contract`
    pub fn builder(contract: ContractId, bridge: Arc<dyn HolderBridge>) -> HolderAppBuilder {
        HolderAppBuilder {
            contract,
            bridge,
            config: AppConfig::default(),
            session: None,
            registry: None,
            clock: None,
            diagnostics: None,
        }
    }

    /// Contract identifier
    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// Effective configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Remote bridge
    pub fn bridge(&self) -> &Arc<dyn HolderBridge> {
        &self.bridge
    }

    /// Snapshot provider
    pub fn provider(&self) -> &Arc<HolderStateProvider> {
        &self.provider
    }

    /// Viewer session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Shared dispatch registry
    pub fn registry(&self) -> &Arc<DispatchRegistry> {
        &self.registry
    }

    /// Clock
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fetch a fresh snapshot
    pub async fn refresh(&self) -> Result<Arc<HolderSnapshot>, HolderError> {
        self.provider.refetch().await
    }

    /// Current snapshot, if loaded
    pub fn snapshot(&self) -> Option<Arc<HolderSnapshot>> {
        self.provider.snapshot()
    }

    /// Viewer role for the current snapshot.
    ///
    /// Before a snapshot is loaded nobody is treated as the owner.
    pub fn role(&self) -> ViewerRole {
        match self.snapshot() {
            Some(snapshot) => self.session.role_for(&snapshot),
            None => ViewerRole {
                is_owned_by_current_user: false,
                is_authenticated: self.session.viewer().is_some(),
            },
        }
    }

    /// Eligibility of `action` now; fully restrictive without a snapshot.
    pub fn eligibility(&self, action: HolderAction) -> ActionEligibility {
        let Some(snapshot) = self.snapshot() else {
            return ActionEligibility::DENIED;
        };
        let role = self.session.role_for(&snapshot);
        let flags = EligibilityFlags::from_state(&snapshot.state, self.clock.now_ms());
        evaluate(
            action,
            role,
            &snapshot.state,
            flags,
            self.diagnostics.as_ref(),
        )
    }

    /// Eligibility of every action now, if a snapshot is loaded
    pub fn permitted_actions(&self) -> Option<EligibilityTable> {
        let snapshot = self.snapshot()?;
        let role = self.session.role_for(&snapshot);
        let flags = EligibilityFlags::from_state(&snapshot.state, self.clock.now_ms());
        Some(permitted_actions(
            role,
            &snapshot.state,
            flags,
            self.diagnostics.as_ref(),
        ))
    }

    /// New UI slot for `action`
    pub fn action(&self, action: HolderAction) -> ActionHandle {
        let handle = ActionHandle::new(
            DispatchKey {
                contract: self.contract.clone(),
                action,
            },
            Arc::clone(&self.registry),
            self.session.clone(),
            Arc::clone(&self.diagnostics),
        );
        if self.config.dispatch.refetch_after_action {
            handle.with_refetch(Arc::clone(&self.provider))
        } else {
            handle
        }
    }

    /// Expiration monitor over this app's snapshots
    pub fn expiration_monitor(&self) -> ExpirationMonitor {
        ExpirationMonitor::new(
            &self.provider,
            Arc::clone(&self.clock),
            self.config.expiration.clone(),
        )
    }

    /// User-visible text for `error`
    pub fn user_message(&self, error: &ActionError) -> String {
        error.user_message(self.clock.now_ms(), self.config.debug_error_context)
    }
}

impl std::fmt::Debug for HolderApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolderApp")
            .field("contract", &self.contract)
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
