//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the track list, selection,
//! the latest engine snapshot and the lyrics for the playing track.

mod model;

pub use model::*;
