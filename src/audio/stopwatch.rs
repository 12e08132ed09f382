use std::time::{Duration, Instant};

/// Elapsed-time accounting for the active source across pauses and seeks.
#[derive(Debug, Default)]
pub(super) struct Stopwatch {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Stopwatch {
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
    }

    /// Jump to `position`, keeping the running/paused state.
    pub fn reset_to(&mut self, position: Duration) {
        let running = self.started_at.is_some();
        self.accumulated = position;
        self.started_at = running.then(Instant::now);
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}
