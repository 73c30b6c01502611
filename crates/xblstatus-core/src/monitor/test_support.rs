//! In-memory source and sink used by monitor tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use serde_json::json;

use super::{FetchError, PresenceSink, PresenceSource, SinkError};
use crate::presence::RawPresence;

pub fn playing(device: &str, name: &str, rich_presence: Option<&str>) -> RawPresence {
    let mut title = json!({"name": name, "placement": "Full", "state": "Active"});
    if let Some(text) = rich_presence {
        title["activity"] = json!({"richPresence": text});
    }
    serde_json::from_value(json!({
        "state": "Online",
        "devices": [{"type": device, "titles": [title]}]
    }))
    .unwrap()
}

pub fn offline() -> RawPresence {
    serde_json::from_value(json!({"state": "Offline", "devices": []})).unwrap()
}

pub fn api_error(code: i64, message: &str) -> RawPresence {
    serde_json::from_value(json!({
        "success": false,
        "error_code": code,
        "error_message": message
    }))
    .unwrap()
}

/// Replays queued responses, then repeats `fallback` forever.
pub struct FakeSource {
    queue: Mutex<VecDeque<Result<RawPresence, FetchError>>>,
    fallback: RawPresence,
    fetches: Arc<Mutex<usize>>,
}

impl FakeSource {
    pub fn repeating(fallback: RawPresence) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            fetches: Arc::new(Mutex::new(0)),
        }
    }

    pub fn then(self, response: Result<RawPresence, FetchError>) -> Self {
        self.queue.lock().unwrap().push_back(response);
        self
    }

    pub fn fetch_count(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.fetches)
    }
}

impl PresenceSource for FakeSource {
    async fn fetch(&self, _account_id: &str) -> Result<RawPresence, FetchError> {
        *self.fetches.lock().unwrap() += 1;
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Connect,
    WaitUntilReady,
    SetStatus(Option<String>),
    Disconnect,
}

#[derive(Default)]
pub struct FakeSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
    failing_pushes: usize,
    fail_connect: bool,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the next `count` status updates.
    pub fn failing_pushes(mut self, count: usize) -> Self {
        self.failing_pushes = count;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<SinkCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PresenceSink for FakeSink {
    async fn connect(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Connect);
        if self.fail_connect {
            return Err(SinkError::Backend("connection refused".to_string()));
        }
        Ok(())
    }

    async fn wait_until_ready(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::WaitUntilReady);
        Ok(())
    }

    async fn set_status(&mut self, status: Option<&str>) -> Result<(), SinkError> {
        self.record(SinkCall::SetStatus(status.map(str::to_string)));
        if self.failing_pushes > 0 {
            self.failing_pushes -= 1;
            return Err(SinkError::Backend("rate limited".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Disconnect);
        Ok(())
    }
}

pub fn status_calls(calls: &Arc<Mutex<Vec<SinkCall>>>) -> Vec<Option<String>> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            SinkCall::SetStatus(status) => Some(status.clone()),
            _ => None,
        })
        .collect()
}

/// Log output captured by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's logs into a buffer until the guard is dropped.
///
/// Only sees events from the current thread, so use it with the default
/// single-threaded `#[tokio::test]` runtime.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}
