use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{PresenceSink, PresenceSource};
use crate::config::MonitorConfig;
use crate::presence::{ApiError, ChangeGate, TitleSettings, derive_status};

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The candidate matched the last pushed status.
    Unchanged,
    /// The sink accepted the new status (`None` clears it).
    Pushed(Option<String>),
    /// The sink rejected the update; it is retried next cycle.
    PushFailed,
    /// Presence could not be fetched or decoded.
    FetchFailed,
    /// The API answered with `success: false`.
    ApiError(ApiError),
}

/// Polls presence for one account and pushes status changes.
///
/// Owns the last-emitted status; nothing else reads or writes it.
#[derive(Debug)]
pub struct StatusMonitor {
    account_id: String,
    interval: Duration,
    title_settings: TitleSettings,
    gate: ChangeGate,
}

impl StatusMonitor {
    pub fn new(account_id: String, interval: Duration, title_settings: TitleSettings) -> Self {
        Self {
            account_id,
            interval,
            title_settings,
            gate: ChangeGate::new(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.xbox_live_id.clone(),
            config.update_interval(),
            config.title_settings.clone(),
        )
    }

    pub fn last_emitted(&self) -> Option<&str> {
        self.gate.last_emitted()
    }

    /// Runs one fetch → format → gate → push cycle.
    ///
    /// Never fails: every error is logged and reported as an outcome.
    pub async fn poll_once<S, K>(&mut self, source: &S, sink: &mut K) -> CycleOutcome
    where
        S: PresenceSource,
        K: PresenceSink,
    {
        tracing::info!("Requesting data from Xbox API");
        let presence = match source.fetch(&self.account_id).await {
            Ok(presence) => presence,
            Err(err) => {
                tracing::error!("{err}");
                return CycleOutcome::FetchFailed;
            }
        };

        tracing::debug!(?presence, "Xbox API response");

        let candidate = match derive_status(&presence, &self.title_settings) {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::error!(code = err.code, message = %err.message, "{err}");
                return CycleOutcome::ApiError(err);
            }
        };

        if !self.gate.should_push(candidate.as_deref()) {
            tracing::debug!("Status unchanged");
            return CycleOutcome::Unchanged;
        }

        match candidate.as_deref() {
            Some(status) => tracing::info!("Updating status to \"{status}\""),
            None => tracing::info!("Clearing status"),
        }

        match sink.set_status(candidate.as_deref()).await {
            Ok(()) => {
                self.gate.commit(candidate.clone());
                CycleOutcome::Pushed(candidate)
            }
            Err(err) => {
                tracing::error!("Failed to update status: {err}");
                CycleOutcome::PushFailed
            }
        }
    }

    /// Polls until `cancel` fires.
    ///
    /// The interval is slept after each cycle finishes, so processing time
    /// adds to the period. Cancellation interrupts both the sleep and an
    /// in-flight cycle.
    pub async fn run<S, K>(&mut self, source: &S, sink: &mut K, cancel: &CancellationToken)
    where
        S: PresenceSource,
        K: PresenceSink,
    {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Starting presence updates"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.poll_once(source, sink) => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Presence updates stopped");
    }
}
