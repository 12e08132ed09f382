//! Timestamped lyrics: parsing, progress sync and per-track loading.

mod loader;
mod parser;
mod sync;

pub use loader::{LyricDocument, spawn_lyric_loader};
pub use parser::{LyricLine, NO_LYRICS, no_lyrics, parse_lrc};
pub use sync::{LyricSync, active_index};

#[cfg(test)]
mod tests;
