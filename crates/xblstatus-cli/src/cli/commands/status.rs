//! One-shot presence lookup.

use anyhow::{Context, Result};
use xblstatus_core::config::MonitorConfig;
use xblstatus_core::presence::derive_status;
use xblstatus_core::xbox::XboxApiClient;

pub async fn run(config: &MonitorConfig) -> Result<()> {
    let client = XboxApiClient::from_config(config);
    let presence = client
        .presence(&config.xbox_live_id)
        .await
        .context("Failed to fetch presence")?;

    match derive_status(&presence, &config.title_settings)? {
        Some(status) => println!("{status}"),
        None => println!("No status"),
    }
    Ok(())
}
