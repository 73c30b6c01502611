//! Polling loop, shutdown coordination, and the capabilities they drive.
//!
//! The monitor talks to the outside world through three traits:
//! [`PresenceSource`] fetches presence for an account, [`PresenceSink`]
//! publishes a status line to the chat client, and [`TerminationSource`]
//! resolves when the process is asked to stop.

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::presence::RawPresence;

mod lifecycle;
mod poll;
mod termination;
#[cfg(test)]
mod test_support;

pub use lifecycle::{CLEANUP_TIMEOUT, ShutdownController};
pub use poll::{CycleOutcome, StatusMonitor};
pub use termination::OsTermination;

/// Transport or decode failure while fetching presence.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Xbox API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Xbox API returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to decode Xbox API response: {0}")]
    Decode(String),
}

/// Failure reported by the chat client.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("chat client is not connected")]
    NotConnected,
    #[error("chat client connection closed")]
    Closed,
    #[error("{0}")]
    Backend(String),
}

pub trait PresenceSource: Send + Sync {
    /// Fetches presence for an account.
    ///
    /// Payloads the API marks with `success: false` are returned as `Ok`
    /// so callers can tell them apart from transport failures.
    fn fetch(
        &self,
        account_id: &str,
    ) -> impl Future<Output = Result<RawPresence, FetchError>> + Send;
}

pub trait PresenceSink: Send {
    fn connect(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Resolves once the client can accept status updates.
    fn wait_until_ready(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Sets the "currently playing" text, or clears it with `None`.
    fn set_status(
        &mut self,
        status: Option<&str>,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    fn disconnect(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Why the process was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    Interrupt,
    Terminate,
    Hangup,
    ConsoleClose,
    Shutdown,
    Requested,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TerminationReason::Interrupt => "interrupt",
            TerminationReason::Terminate => "terminate",
            TerminationReason::Hangup => "hangup",
            TerminationReason::ConsoleClose => "console close",
            TerminationReason::Shutdown => "system shutdown",
            TerminationReason::Requested => "requested",
        };
        f.write_str(label)
    }
}

pub trait TerminationSource: Send + 'static {
    /// Resolves once termination has been requested.
    fn wait(&mut self) -> impl Future<Output = TerminationReason> + Send;
}

impl TerminationSource for CancellationToken {
    async fn wait(&mut self) -> TerminationReason {
        self.cancelled().await;
        TerminationReason::Requested
    }
}
