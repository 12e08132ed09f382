//! Audio output: the media clock the playback engine drives.
//!
//! [`AudioPlayer`] owns a dedicated thread holding the `rodio` output stream
//! and the single active sink. The engine talks to it through the
//! [`MediaClock`] trait and hears back through [`MediaEvent`]s.

mod fetch;
mod player;
mod sink;
mod stopwatch;
mod thread;
mod types;

pub use player::{AudioPlayer, QuitHandle};
pub use types::*;

#[cfg(test)]
mod tests;
