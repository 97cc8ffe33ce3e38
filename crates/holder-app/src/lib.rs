//! # Holder App - Portable Application Core
//!
//! Headless core shared by every identity holder frontend. It owns no
//! transport and no rendering:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │  Frontend (web, CLI, ...)                      │
//! │    renders HolderStateView / ActionFeature     │
//! └───────────────────────┬────────────────────────┘
//!                         │
//! ┌───────────────────────▼────────────────────────┐
//! │  holder-app                                    │
//! │    HolderApp ── provider ── dispatch registry  │
//! │        │            │                          │
//! │    workflows    expiration monitor             │
//! └───────────────────────┬────────────────────────┘
//!                         │ HolderBridge
//! ┌───────────────────────▼────────────────────────┐
//! │  holder contract                               │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let app = HolderApp::builder(contract_id, bridge)
//!     .session(Session::signed_in(viewer))
//!     .build()?;
//! app.refresh().await?;
//!
//! let restart = app.action(HolderAction::RestartReleaseIdentity);
//! if app.eligibility(HolderAction::RestartReleaseIdentity).can_see_action {
//!     let _ = workflows::release::restart_release_identity(&app, &restart).await;
//! }
//! ```

#![forbid(unsafe_code)]

mod app;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod expiration_monitor;
pub mod provider;
pub mod runtime_bridge;
pub mod session;
pub mod workflows;

#[cfg(test)]
mod test_support;

pub use app::{HolderApp, HolderAppBuilder};
pub use clock::{Clock, SystemClock};
pub use config::{AppConfig, DispatchConfig, ExpirationConfig};
pub use dispatch::{
    ActionErrorState, ActionFeature, ActionHandle, ActionOutcome, ActionStatus, DispatchKey,
    DispatchRegistry,
};
pub use errors::{ActionError, BridgeError, ContractError, Delay, ErrorCategory};
pub use expiration_monitor::{banner_status, ExpirationMonitor, MonitorTask};
pub use provider::{HolderStateProvider, HolderStateView};
pub use runtime_bridge::{ConfirmRegistrationArgs, DeleteProtectedArgs, HolderBridge};
pub use session::{DisconnectSignal, Session};

/// Re-export of the pure layer
pub use holder_core;
