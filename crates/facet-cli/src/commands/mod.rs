//! CLI command implementations

pub mod repair;
pub mod upgrade;

use anyhow::{Context, Result};
use facet_check::CheckConfig;

/// Load the check configuration, falling back to defaults without a file
pub fn load_config(path: Option<&str>) -> Result<CheckConfig> {
    match path {
        Some(path) => CheckConfig::load_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None => Ok(CheckConfig::default()),
    }
}
