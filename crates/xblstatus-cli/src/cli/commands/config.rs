//! Config command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use xblstatus_core::config::MonitorConfig;

pub fn path(config_path: &Path) {
    println!("{}", config_path.display());
}

pub fn init(config_path: &Path) -> Result<()> {
    MonitorConfig::init(config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn check(config_path: &Path, config: &MonitorConfig) {
    println!("Config OK: {}", config_path.display());
    println!("{config}");
}
