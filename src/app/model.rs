//! Application model: the track list, selection and what the engine reports.
//!
//! `App` never drives playback itself. The runtime forwards key presses to
//! the engine and feeds the published state and lyrics back in here.

use std::time::{Duration, Instant};

use crate::config::UiSettings;
use crate::engine::PlaybackState;
use crate::lyrics::{LyricDocument, LyricSync};
use crate::model::{Track, display_from_fields};

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    /// Where the list came from, e.g. a playlist name or search keywords.
    pub source_title: String,

    titles: Vec<String>,
    lower_titles: Option<Vec<String>>,

    pub follow_playback: bool,
    pub filter_mode: bool,
    pub filter_query: String,
    pub metadata_window: bool,
    pub lyric_view: bool,

    pub playback: PlaybackState,
    pub lyrics: LyricDocument,
    pub lyric_sync: LyricSync,
    /// Line the lyric pane is centered on while following playback.
    pub lyric_center: Option<usize>,

    /// Last error or notice shown in the status box.
    pub status: Option<String>,
}

impl App {
    /// Create a new `App` over `tracks`, titled for display with `ui` settings.
    pub fn new(tracks: Vec<Track>, source_title: impl Into<String>, ui: &UiSettings) -> Self {
        let titles: Vec<String> = tracks
            .iter()
            .map(|t| display_from_fields(t, &ui.list_track_fields, &ui.track_separator))
            .collect();

        // Precompute lowercase titles for larger lists so fuzzy filtering
        // avoids per-char conversions on every redraw/keystroke.
        let lower_titles = if titles.len() > 100 {
            Some(titles.iter().map(|t| t.to_lowercase()).collect())
        } else {
            None
        };

        Self {
            tracks,
            selected: 0,
            source_title: source_title.into(),
            titles,
            lower_titles,
            follow_playback: ui.follow_playback,
            filter_mode: false,
            filter_query: String::new(),
            metadata_window: false,
            lyric_view: ui.show_lyrics,
            playback: PlaybackState::default(),
            lyrics: LyricDocument::default(),
            lyric_sync: LyricSync::new(Duration::from_millis(ui.lyric_scrub_timeout_ms)),
            lyric_center: None,
            status: None,
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn toggle_lyric_view(&mut self) {
        self.lyric_view = !self.lyric_view;
        self.lyric_sync.end_scrub();
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Display title of the track at `index`.
    pub fn title(&self, index: usize) -> &str {
        self.titles.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Index in `tracks` of the track the engine is playing.
    pub fn playing_index(&self) -> Option<usize> {
        let id = self.playback.current_id()?;
        self.tracks.iter().position(|t| t.id == id)
    }

    /// The visible tracks in display order; used as the play queue.
    pub fn visible_queue(&self) -> Vec<Track> {
        self.display_indices()
            .into_iter()
            .filter_map(|i| self.tracks.get(i).cloned())
            .collect()
    }

    /// Take a new engine snapshot; moves the cursor along when following.
    pub fn apply_playback(&mut self, state: PlaybackState) {
        self.playback = state;

        if self.follow_playback && !self.filter_mode {
            if let Some(idx) = self.playing_index() {
                if self.selected != idx {
                    self.set_selected(idx);
                }
            }
        }
    }

    /// Swap in the lyrics for a new track and forget any scroll position.
    pub fn apply_lyrics(&mut self, doc: LyricDocument) {
        self.lyrics = doc;
        self.lyric_sync.reset();
        self.lyric_center = None;
    }

    /// Advance lyric sync to the current progress.
    pub fn tick_lyrics(&mut self, now: Instant) {
        if let Some(line) = self
            .lyric_sync
            .update(&self.lyrics.lines, self.playback.progress, now)
        {
            self.lyric_center = Some(line);
        }
    }

    /// Move the lyric scrub cursor by `delta` lines.
    pub fn scrub_lyrics(&mut self, delta: isize, now: Instant) {
        self.lyric_sync.scrub_by(delta, self.lyrics.lines.len(), now);
    }

    /// End the lyric scrub and return the start time of the line it was on.
    pub fn commit_lyric_scrub(&mut self) -> Option<f64> {
        let line = self.lyric_sync.commit_scrub()?;
        self.lyrics.lines.get(line).map(|l| l.time)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Return the display order of track indices, taking active filtering into account.
    pub fn display_indices(&self) -> Vec<usize> {
        let base = 0..self.tracks.len();

        let query = self.filter_query.trim();
        if query.is_empty() {
            return base.collect();
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                let query_lower = query.to_lowercase();
                base.filter(|&i| {
                    Self::fuzzy_match_positions_lower(&lower_titles[i], &query_lower).is_some()
                })
                .collect()
            }
            None => base
                .filter(|&i| Self::fuzzy_match_positions(&self.titles[i], query).is_some())
                .collect(),
        }
    }

    /// Return true if this `App` uses precomputed lowercase titles.
    pub fn uses_lower_titles(&self) -> bool {
        self.lower_titles.is_some()
    }

    /// Fuzzy-match `query_lower` against a specific track by index.
    ///
    /// Returns the character positions that match, or `None` when there is no match.
    pub fn fuzzy_match_positions_for_track_lower(
        &self,
        track_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                Self::fuzzy_match_positions_lower(&lower_titles[track_index], query_lower)
            }
            None => Self::fuzzy_match_positions(self.title(track_index), query_lower),
        }
    }

    /// Return the next visible index after `current`, wrapping to the first.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping to the last.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
            None => Some(display[display.len() - 1]),
        }
    }

    /// Set the selected track index and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars().flat_map(char::to_lowercase) {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_lowercase().eq(std::iter::once(qc)) => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    fn fuzzy_match_positions_lower(title_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc == qc => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode: enable filtering and stop following playback.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }
}
