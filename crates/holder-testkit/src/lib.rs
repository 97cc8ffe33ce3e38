//! Identity Holder Testing Infrastructure
//!
//! Shared doubles and fixtures for the holder crates' integration tests.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! holder-testkit = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use holder_testkit::*;
//!
//! #[tokio::test]
//! async fn restart_from_failed_release() {
//!     let snapshot = fixtures::release(ReleaseSubState::StartRelease);
//!     let bridge = MockHolderBridge::with_snapshot(snapshot);
//!     let app = app_for(&bridge, fixtures::owner());
//!     // ...
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod diagnostics;
pub mod fixtures;
pub mod mocks;
pub mod strategies;
pub mod time;

pub use diagnostics::{Diagnostic, RecordingDiagnostics};
pub use mocks::{Gate, MockHolderBridge};
pub use time::ControllableClock;

use holder_app::{AppConfig, HolderApp, Session};
use holder_core::{ContractId, Principal};
use std::sync::Arc;

/// Contract id used by every fixture
pub const TEST_CONTRACT: &str = "holder-test-contract";

/// App over `bridge`, signed in as `viewer`, with a controllable clock at 0
/// and recording diagnostics.
pub fn app_for(bridge: &MockHolderBridge, viewer: Principal) -> TestApp {
    app_with_config(bridge, viewer, AppConfig::default())
}

/// Like [`app_for`] with an explicit configuration.
pub fn app_with_config(bridge: &MockHolderBridge, viewer: Principal, config: AppConfig) -> TestApp {
    let clock = ControllableClock::new(0);
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let app = HolderApp::builder(ContractId::new(TEST_CONTRACT), Arc::new(bridge.clone()))
        .config(config)
        .session(Session::signed_in(viewer))
        .clock(Arc::new(clock.clone()))
        .diagnostics(Arc::clone(&diagnostics) as _)
        .build()
        .expect("test configuration is valid");
    TestApp {
        app,
        clock,
        diagnostics,
    }
}

/// An app together with the handles tests steer it with.
pub struct TestApp {
    /// The app under test
    pub app: HolderApp,
    /// Its clock
    pub clock: ControllableClock,
    /// Its diagnostic sink
    pub diagnostics: Arc<RecordingDiagnostics>,
}

/// Install a test-writer tracing subscriber; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
