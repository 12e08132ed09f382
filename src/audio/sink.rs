//! Utilities for creating `rodio` sinks from in-memory streams.
//!
//! The helpers here decode a buffered stream and prepare a paused `Sink` at
//! the requested start position.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use lofty::file::AudioFile;
use lofty::probe::Probe;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::MediaError;

/// Decode `bytes` and skip to `start_at`.
pub(super) fn decode_at(
    bytes: Arc<[u8]>,
    start_at: Duration,
) -> Result<impl Source + Send + 'static, MediaError> {
    let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| MediaError::Decode(e.to_string()))?;
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    Ok(decoder.skip_duration(start_at))
}

/// Create a paused `Sink` for `bytes` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: Option<&OutputStream>,
    bytes: Arc<[u8]>,
    start_at: Duration,
    volume: f32,
) -> Result<Sink, MediaError> {
    let stream =
        stream.ok_or_else(|| MediaError::OutputUnavailable("no output device".to_string()))?;
    let source = decode_at(bytes, start_at)?;

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Total length of the buffered stream: decoder first, then a tag/header probe.
pub(super) fn source_duration(bytes: &Arc<[u8]>) -> Option<Duration> {
    let from_decoder = Decoder::new(Cursor::new(bytes.clone()))
        .ok()
        .and_then(|d| d.total_duration());
    from_decoder
        .or_else(|| probe_duration(bytes))
        .filter(|d| !d.is_zero())
}

fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration())
}
