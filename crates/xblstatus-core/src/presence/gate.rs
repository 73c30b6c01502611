/// Remembers the last status pushed to the sink.
///
/// A candidate is pushed only when it differs from the last committed
/// value. Comparison is exact, and `None` equals `None`.
#[derive(Debug, Default)]
pub struct ChangeGate {
    last_emitted: Option<String>,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_emitted(&self) -> Option<&str> {
        self.last_emitted.as_deref()
    }

    pub fn should_push(&self, candidate: Option<&str>) -> bool {
        self.last_emitted.as_deref() != candidate
    }

    /// Records a candidate that the sink accepted.
    pub fn commit(&mut self, candidate: Option<String>) {
        self.last_emitted = candidate;
    }
}
