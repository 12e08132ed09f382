//! Catalogue data model: tracks, albums, artists, playlists and users.
//!
//! These are value objects decoded from the catalogue API. The playback
//! engine only ever holds copies; nothing here is shared mutably.

mod display;
mod track;

pub use display::display_from_fields;
pub use track::*;

#[cfg(test)]
mod tests;
