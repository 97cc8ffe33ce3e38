//! `holder expiration`

use anyhow::{bail, Result};
use clap::Args;
use holder_app::{AppConfig, Clock, SystemClock};
use holder_core::{
    compute_status_with, CertificateExpirationStatus, CertificateInfo, ExpirationInput,
};
use serde_json::json;
use std::path::PathBuf;

use super::{describe_status, load_app};

#[derive(Args, Debug)]
pub struct ExpirationArgs {
    /// Snapshot JSON file; takes precedence over the raw flags
    #[arg(short, long, conflicts_with_all = ["expiration", "deadline", "sale_completed"])]
    pub snapshot: Option<PathBuf>,

    /// Certificate expiration (ms since epoch)
    #[arg(long)]
    pub expiration: Option<u64>,

    /// Explicit unsellable deadline (ms since epoch)
    #[arg(long)]
    pub deadline: Option<u64>,

    /// The identity has already been sold
    #[arg(long)]
    pub sale_completed: bool,

    /// Evaluate at this time (ms since epoch) instead of now
    #[arg(long)]
    pub now: Option<u64>,

    /// Emit JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &ExpirationArgs, config: &AppConfig) -> Result<String> {
    let (status, banner) = match (&args.snapshot, args.expiration) {
        (Some(path), _) => {
            let app = load_app(path, None, args.now, config).await?;
            let monitor = app.expiration_monitor();
            let status = monitor.tick();
            (status, monitor.banner())
        }
        (None, Some(expiration_ms)) => {
            let now_ms = args.now.unwrap_or_else(|| SystemClock.now_ms());
            let status = raw_status(
                CertificateInfo {
                    expiration_ms,
                    unsellable_deadline_ms: args.deadline,
                },
                now_ms,
                args.sale_completed,
                config,
            );
            let banner = if args.sale_completed {
                None
            } else {
                Some(status).filter(CertificateExpirationStatus::needs_attention)
            };
            (Some(status), banner)
        }
        (None, None) => bail!("either --snapshot or --expiration is required"),
    };

    if args.json {
        let value = json!({ "status": status, "banner": banner });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
    }

    let mut out = format!("Status: {}\n", describe_status(status));
    if banner.is_some() {
        out.push_str("Banner: shown\n");
    }
    Ok(out)
}

fn raw_status(
    certificate: CertificateInfo,
    now_ms: u64,
    sale_completed: bool,
    config: &AppConfig,
) -> CertificateExpirationStatus {
    compute_status_with(ExpirationInput::from_certificate(
        &certificate,
        now_ms,
        config.expiration.safety_window_ms,
        config.expiration.unsellable_margin_ms,
        sale_completed,
    ))
}
