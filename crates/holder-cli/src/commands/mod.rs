//! CLI command handlers.
//!
//! Handlers return their rendered output; `main` prints it.

pub mod config;
pub mod eligibility;
pub mod expiration;
pub mod snapshot_file;

use holder_app::Clock;

/// Clock pinned by `--now`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

use anyhow::{Context, Result};
use holder_app::errors::format_duration_ms;
use holder_app::{AppConfig, HolderApp, Session, SystemClock};
use holder_core::{CertificateExpirationStatus, ContractId, Principal};
use snapshot_file::SnapshotFileBridge;
use std::path::Path;
use std::sync::Arc;

/// Build an app over a snapshot file and load it once.
pub async fn load_app(
    snapshot: &Path,
    viewer: Option<&str>,
    now_ms: Option<u64>,
    config: &AppConfig,
) -> Result<HolderApp> {
    let session = match viewer {
        Some(text) => Session::signed_in(Principal::parse(text)?),
        None => Session::anonymous(),
    };
    let clock: Arc<dyn Clock> = match now_ms {
        Some(now_ms) => Arc::new(FixedClock(now_ms)),
        None => Arc::new(SystemClock),
    };
    let contract = ContractId::new(snapshot.display().to_string());

    let app = HolderApp::builder(contract, Arc::new(SnapshotFileBridge::new(snapshot)))
        .config(config.clone())
        .session(session)
        .clock(clock)
        .build()?;
    app.refresh()
        .await
        .with_context(|| format!("reading snapshot {}", snapshot.display()))?;
    Ok(app)
}

/// One-line rendering of a certificate status
pub fn describe_status(status: Option<CertificateExpirationStatus>) -> String {
    match status {
        None => "no certificate".to_string(),
        Some(CertificateExpirationStatus::WillExpireSoon {
            duration_till_unsellable_ms,
        }) => format!(
            "willExpireSoon (unsellable in {})",
            format_duration_ms(duration_till_unsellable_ms)
        ),
        Some(status) => status.label().to_string(),
    }
}
