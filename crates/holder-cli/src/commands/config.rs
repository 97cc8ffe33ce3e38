//! `holder config`

use anyhow::Result;
use holder_app::AppConfig;

/// Render the effective configuration as TOML.
pub fn run(config: &AppConfig) -> Result<String> {
    Ok(config.to_toml_string()?)
}
