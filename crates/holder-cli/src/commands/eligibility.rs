//! `holder eligibility`

use anyhow::{Context, Result};
use clap::Args;
use holder_app::AppConfig;
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

use super::{describe_status, load_app};

#[derive(Args, Debug)]
pub struct EligibilityArgs {
    /// Snapshot JSON file
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Signed-in principal; anonymous when omitted
    #[arg(long)]
    pub viewer: Option<String>,

    /// Evaluate at this time (ms since epoch) instead of now
    #[arg(long)]
    pub now: Option<u64>,

    /// Include actions that would not be rendered
    #[arg(long)]
    pub all: bool,

    /// Emit JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &EligibilityArgs, config: &AppConfig) -> Result<String> {
    let app = load_app(&args.snapshot, args.viewer.as_deref(), args.now, config).await?;
    let snapshot = app.snapshot().context("snapshot not loaded")?;
    let table = app.permitted_actions().context("snapshot not loaded")?;

    let monitor = app.expiration_monitor();
    let status = monitor.tick();
    let banner = monitor.banner();

    let role = app.role();
    let actions: Vec<_> = table
        .entries()
        .iter()
        .filter(|(_, e)| args.all || e.can_see_action)
        .collect();
    tracing::debug!(
        phase = snapshot.phase().label(),
        visible = actions.len(),
        "evaluated eligibility"
    );

    if args.json {
        let value = json!({
            "phase": snapshot.phase().label(),
            "subState": snapshot.state.sub_state_name(),
            "processingError": snapshot.state.has_processing_error(),
            "role": role,
            "actions": actions
                .iter()
                .map(|(action, e)| json!({
                    "action": action.as_str(),
                    "canPerform": e.can_perform,
                    "canSeeAction": e.can_see_action,
                }))
                .collect::<Vec<_>>(),
            "certificateStatus": status,
            "banner": banner,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
    }

    let mut out = String::new();
    writeln!(
        out,
        "Phase:       {}{}",
        snapshot.phase(),
        snapshot
            .state
            .sub_state_name()
            .map(|name| format!(".{name}"))
            .unwrap_or_default()
    )?;
    if let Some(error) = snapshot.state.processing_error() {
        writeln!(out, "Last step:   failed at {} ({})", error.time_ms, error.message)?;
    }
    writeln!(
        out,
        "Viewer:      {}",
        match (role.is_owned_by_current_user, role.is_authenticated) {
            (true, _) => "owner",
            (false, true) => "signed in, not owner",
            (false, false) => "anonymous",
        }
    )?;
    writeln!(out, "Certificate: {}", describe_status(status))?;
    if banner.is_some() {
        writeln!(out, "Banner:      {}", describe_status(banner))?;
    }

    writeln!(out)?;
    if actions.is_empty() {
        writeln!(out, "No actions available")?;
    }
    for (action, e) in actions {
        let mark = match (e.can_see_action, e.can_perform) {
            (_, true) => "enabled",
            (true, false) => "disabled",
            (false, false) => "hidden",
        };
        writeln!(out, "  {:<38} {mark}", action.as_str())?;
    }
    Ok(out)
}
