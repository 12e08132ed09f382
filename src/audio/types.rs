//! Media clock seam: the trait, its events and its errors.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Identifies one loaded source; bumped on every `load`.
pub type SourceId = u64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("no source loaded")]
    NoSource,
    #[error("audio thread is not running")]
    Disconnected,
    #[error("failed to fetch stream: {0}")]
    Fetch(String),
    #[error("failed to decode stream: {0}")]
    Decode(String),
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Elapsed seconds of the current source.
    TimeUpdate(f64),
    /// Total length in seconds, once known.
    DurationKnown(f64),
    /// The oldest outstanding [`MediaClock::seek`] has taken effect.
    Seeked,
    Ended,
    Error(MediaError),
}

/// An event emitted by the media clock for a particular source.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub source: SourceId,
    pub kind: MediaEventKind,
}

/// The audio primitive the playback engine drives.
///
/// Calls never block on I/O; outcomes of loading and decoding arrive later as
/// [`MediaEvent`]s tagged with the [`SourceId`] returned by [`MediaClock::load`].
pub trait MediaClock: Send + 'static {
    /// Replace the active source with the stream at `url`. Starts paused.
    fn load(&mut self, url: &str) -> SourceId;
    /// Start or resume playback. Restarts from 0 after the source ended.
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    /// Move to `position`. Answered with [`MediaEventKind::Seeked`] unless
    /// the source fails first.
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
}

/// Commands handled by the audio thread.
#[derive(Debug)]
pub(super) enum AudioCmd {
    Load { source: SourceId, url: String },
    /// Sent by the loader thread once the stream bytes are in memory.
    Loaded {
        source: SourceId,
        result: Result<Arc<[u8]>, MediaError>,
    },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
