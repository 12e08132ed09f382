use std::time::{Duration, Instant};

use super::parser::LyricLine;

/// Index of the last line whose start time has been reached.
///
/// `lines` must be sorted by time. `None` before the first line starts.
pub fn active_index(lines: &[LyricLine], progress: f64) -> Option<usize> {
    let mut active = None;
    for (i, line) in lines.iter().enumerate() {
        if line.time > progress {
            break;
        }
        active = Some(i);
    }
    active
}

/// Follows playback through a lyric document and decides when the view
/// should re-center.
///
/// While the user scrubs through the lines by hand, auto-scroll is held
/// until the scrub ends or sits idle for longer than the timeout.
#[derive(Debug)]
pub struct LyricSync {
    active: Option<usize>,
    scrub: Option<Scrub>,
    scrub_timeout: Duration,
    recenter: bool,
}

#[derive(Debug, Clone, Copy)]
struct Scrub {
    cursor: usize,
    touched: Instant,
}

impl LyricSync {
    pub fn new(scrub_timeout: Duration) -> Self {
        Self {
            active: None,
            scrub: None,
            scrub_timeout,
            recenter: false,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    /// Line under the manual scrub cursor.
    pub fn scrub_cursor(&self) -> Option<usize> {
        self.scrub.map(|s| s.cursor)
    }

    /// Forget all position state; used when the document changes.
    pub fn reset(&mut self) {
        self.active = None;
        self.scrub = None;
        self.recenter = false;
    }

    /// Recompute the active line for `progress`.
    ///
    /// Returns the line to center when the active line changed, or when a
    /// scrub just ended, unless a scrub is still in progress.
    pub fn update(&mut self, lines: &[LyricLine], progress: f64, now: Instant) -> Option<usize> {
        if let Some(scrub) = self.scrub {
            if now.duration_since(scrub.touched) >= self.scrub_timeout {
                self.end_scrub();
            }
        }

        let active = active_index(lines, progress);
        if active != self.active {
            self.active = active;
            self.recenter = true;
        }

        if self.scrub.is_some() || !self.recenter {
            return None;
        }
        self.recenter = false;
        active
    }

    /// Move the scrub cursor by `delta` lines, starting a scrub at the active
    /// line if none is running. Clamped to `0..len`.
    pub fn scrub_by(&mut self, delta: isize, len: usize, now: Instant) {
        if len == 0 {
            return;
        }
        let start = self
            .scrub
            .map(|s| s.cursor)
            .or(self.active)
            .unwrap_or(0);
        let cursor = start.saturating_add_signed(delta).min(len - 1);
        self.scrub = Some(Scrub {
            cursor,
            touched: now,
        });
    }

    /// Stop scrubbing; the next update re-centers on the active line.
    pub fn end_scrub(&mut self) {
        if self.scrub.take().is_some() {
            self.recenter = true;
        }
    }

    /// End the scrub and return the line it was on, so playback can seek there.
    pub fn commit_scrub(&mut self) -> Option<usize> {
        let cursor = self.scrub_cursor();
        self.end_scrub();
        cursor
    }
}
