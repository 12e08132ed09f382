//! Playback engine: the single source of truth for what is playing and how.
//!
//! [`PlaybackEngine`] is a plain state machine over a [`MediaClock`]; the
//! [`spawn_engine`] actor feeds it caller commands, media events and URL
//! resolutions one at a time and publishes [`PlaybackState`] snapshots.
//!
//! [`MediaClock`]: crate::audio::MediaClock

mod actor;
mod core;
mod error;
mod state;
mod url_cache;

pub use actor::{EngineCmd, EngineHandle, spawn_engine};
pub use self::core::{EngineChannels, EngineOptions, PlayReply, PlaybackEngine, Resolved};
pub use error::EngineError;
pub use state::{PlaybackState, PlayerPhase};
pub use url_cache::UrlCache;
