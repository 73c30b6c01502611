//! Operating system termination signals.
//!
//! Unix listens for SIGINT, SIGTERM and SIGHUP. Windows listens for
//! Ctrl+C, Ctrl+Break, console close and system shutdown. Handlers are
//! registered by [`OsTermination::install`], so signals that arrive before
//! anyone waits are still observed instead of killing the process.

use super::{TerminationReason, TerminationSource};

#[cfg(unix)]
pub struct OsTermination {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsTermination {
    /// Registers the signal handlers. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if a handler cannot be registered.
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }
}

#[cfg(unix)]
impl TerminationSource for OsTermination {
    async fn wait(&mut self) -> TerminationReason {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationReason::Interrupt,
            _ = self.terminate.recv() => TerminationReason::Terminate,
            _ = self.hangup.recv() => TerminationReason::Hangup,
        }
    }
}

#[cfg(windows)]
pub struct OsTermination {
    ctrl_c: tokio::signal::windows::CtrlC,
    ctrl_break: tokio::signal::windows::CtrlBreak,
    ctrl_close: tokio::signal::windows::CtrlClose,
    ctrl_shutdown: tokio::signal::windows::CtrlShutdown,
}

#[cfg(windows)]
impl OsTermination {
    /// Registers the console control handlers. Must be called inside a
    /// tokio runtime.
    ///
    /// # Errors
    /// Returns an error if a handler cannot be registered.
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::windows;

        Ok(Self {
            ctrl_c: windows::ctrl_c()?,
            ctrl_break: windows::ctrl_break()?,
            ctrl_close: windows::ctrl_close()?,
            ctrl_shutdown: windows::ctrl_shutdown()?,
        })
    }
}

#[cfg(windows)]
impl TerminationSource for OsTermination {
    async fn wait(&mut self) -> TerminationReason {
        tokio::select! {
            _ = self.ctrl_c.recv() => TerminationReason::Interrupt,
            _ = self.ctrl_break.recv() => TerminationReason::Interrupt,
            _ = self.ctrl_close.recv() => TerminationReason::ConsoleClose,
            _ = self.ctrl_shutdown.recv() => TerminationReason::Shutdown,
        }
    }
}
