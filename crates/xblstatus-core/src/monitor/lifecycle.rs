use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::poll::StatusMonitor;
use super::{PresenceSink, PresenceSource, SinkError, TerminationSource};

/// Upper bound for each cleanup call made while shutting down.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the monitor between sink startup and a graceful shutdown.
///
/// Startup connects the sink and waits until it is ready. Polling then
/// continues until the termination source fires, after which the remote
/// status is cleared and the sink disconnected. `run` consumes the
/// controller, so cleanup happens at most once.
pub struct ShutdownController<S, K, T> {
    monitor: StatusMonitor,
    source: S,
    sink: K,
    termination: T,
    cleanup_timeout: Duration,
}

impl<S, K, T> ShutdownController<S, K, T>
where
    S: PresenceSource,
    K: PresenceSink,
    T: TerminationSource,
{
    pub fn new(monitor: StatusMonitor, source: S, sink: K, termination: T) -> Self {
        Self {
            monitor,
            source,
            sink,
            termination,
            cleanup_timeout: CLEANUP_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.cleanup_timeout = timeout;
        self
    }

    /// Runs until termination.
    ///
    /// # Errors
    /// Returns an error if the sink cannot connect or fails before it
    /// becomes ready. Errors after startup are logged, not returned.
    pub async fn run(self) -> Result<(), SinkError> {
        let Self {
            mut monitor,
            source,
            mut sink,
            mut termination,
            cleanup_timeout,
        } = self;

        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                let reason = termination.wait().await;
                tracing::info!(
                    %reason,
                    "Termination requested, resetting user status and cleaning up"
                );
                cancel.cancel();
            }
        });

        let result = Self::start_and_poll(&mut monitor, &source, &mut sink, &cancel).await;
        watcher.abort();

        match result {
            Started::Interrupted | Started::Connected => {
                cleanup(&mut sink, cleanup_timeout).await;
                Ok(())
            }
            Started::ConnectFailed(err) => Err(err),
            Started::NotReady(err) => {
                cleanup(&mut sink, cleanup_timeout).await;
                Err(err)
            }
        }
    }

    async fn start_and_poll(
        monitor: &mut StatusMonitor,
        source: &S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Started {
        tracing::info!("Connecting to chat client");
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Started::Interrupted,
            result = sink.connect() => {
                if let Err(err) = result {
                    tracing::error!("Failed to connect to chat client: {err}");
                    return Started::ConnectFailed(err);
                }
            }
        }

        tracing::info!("Waiting for chat client to become ready");
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Started::Connected,
            result = sink.wait_until_ready() => {
                if let Err(err) = result {
                    tracing::error!("Chat client failed before becoming ready: {err}");
                    return Started::NotReady(err);
                }
            }
        }

        tracing::info!("Chat client ready");
        monitor.run(source, sink, cancel).await;
        Started::Connected
    }
}

/// How startup ended, which decides whether cleanup is needed.
enum Started {
    /// Cancelled while connecting; the connection may be half open.
    Interrupted,
    /// Connected, then waited or polled until cancelled.
    Connected,
    ConnectFailed(SinkError),
    NotReady(SinkError),
}

/// Clears the remote status and disconnects, best effort.
async fn cleanup<K: PresenceSink>(sink: &mut K, timeout: Duration) {
    match tokio::time::timeout(timeout, sink.set_status(None)).await {
        Ok(Ok(())) => tracing::info!("Cleared status"),
        Ok(Err(err)) => tracing::warn!("Failed to clear status during shutdown: {err}"),
        Err(_) => tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Timed out clearing status during shutdown"
        ),
    }

    match tokio::time::timeout(timeout, sink.disconnect()).await {
        Ok(Ok(())) => tracing::info!("Disconnected from chat client"),
        Ok(Err(err)) => tracing::warn!("Failed to disconnect during shutdown: {err}"),
        Err(_) => tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Timed out disconnecting during shutdown"
        ),
    }
}
