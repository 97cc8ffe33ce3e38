//! Configuration loading for the CLI.

use anyhow::{Context, Result};
use holder_app::AppConfig;
use std::path::Path;

/// File, then `HOLDER_*` environment, then `--set` overrides; validated.
pub fn load_config(path: Option<&Path>, overrides: &[String]) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.merge_with_env()?;

    for item in overrides {
        let (key, value) = item
            .split_once('=')
            .with_context(|| format!("override {item:?} is not KEY=VALUE"))?;
        config.set_from_string(key.trim(), value)?;
    }

    config.validate()?;
    Ok(config)
}
