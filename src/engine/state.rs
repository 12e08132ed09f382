use crate::model::Track;

/// Output level at startup when nothing else is configured.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Lifecycle of the current track.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlayerPhase {
    /// Nothing loaded, or the queue ran out.
    #[default]
    Idle,
    /// Source handed to the media clock; no time or duration reported yet.
    Loading,
    Playing,
    Paused,
    Ended,
    /// The media clock rejected or failed on the source.
    Errored,
}

/// Observable playback state published after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// The playing track, annotated with its resolved stream URL.
    pub current_track: Option<Track>,
    pub playing: bool,
    /// Elapsed seconds within the current track.
    pub progress: f64,
    /// Track length in seconds; 0 until the media clock reports it.
    pub duration: f64,
    /// Output level, 0.0 to 1.0.
    pub volume: f32,
    pub phase: PlayerPhase,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            playing: false,
            progress: 0.0,
            duration: 0.0,
            volume,
            phase: PlayerPhase::Idle,
        }
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current_track.as_ref().map(|t| t.id)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}
