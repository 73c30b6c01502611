//! Long-running bridge: Xbox Live presence to Discord status.

use anyhow::{Context, Result};
use xblstatus_core::config::MonitorConfig;
use xblstatus_core::logging;
use xblstatus_core::monitor::{OsTermination, ShutdownController, StatusMonitor};
use xblstatus_core::xbox::XboxApiClient;
use xblstatus_discord::DiscordSink;

pub async fn run(config: MonitorConfig) -> Result<()> {
    let _log_guard = logging::init(config.logging.as_ref());
    tracing::debug!("Loaded config: {config}");

    let termination = OsTermination::install().context("install signal handlers")?;
    let source = XboxApiClient::from_config(&config);
    let sink = DiscordSink::new(config.discord_app_id);
    let monitor = StatusMonitor::from_config(&config);

    tracing::info!(
        account = %config.xbox_live_id,
        interval_secs = config.update_interval,
        "Starting xblstatus"
    );

    ShutdownController::new(monitor, source, sink, termination)
        .run()
        .await
        .context("Discord connection failed")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
