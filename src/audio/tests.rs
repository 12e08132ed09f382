use std::sync::Arc;
use std::time::Duration;

use super::sink::{create_sink_at, decode_at, source_duration};
use super::stopwatch::Stopwatch;
use super::{AudioPlayer, MediaClock, MediaError};
use crate::config::AudioSettings;

fn garbage() -> Arc<[u8]> {
    Arc::from(&b"definitely not an audio stream"[..])
}

#[test]
fn stopwatch_accumulates_across_pauses_and_seeks() {
    let mut sw = Stopwatch::default();
    assert_eq!(sw.elapsed(), Duration::ZERO);
    assert!(!sw.is_running());

    sw.reset_to(Duration::from_secs(10));
    assert_eq!(sw.elapsed(), Duration::from_secs(10));

    sw.start();
    assert!(sw.is_running());
    std::thread::sleep(Duration::from_millis(20));
    sw.pause();
    let paused_at = sw.elapsed();
    assert!(paused_at >= Duration::from_millis(10_020));

    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(sw.elapsed(), paused_at);

    sw.reset_to(Duration::ZERO);
    assert!(!sw.is_running());
    assert_eq!(sw.elapsed(), Duration::ZERO);
}

#[test]
fn undecodable_bytes_are_a_decode_error() {
    assert!(matches!(
        decode_at(garbage(), Duration::ZERO),
        Err(MediaError::Decode(_))
    ));
    assert_eq!(source_duration(&garbage()), None);
}

#[test]
fn missing_output_device_is_reported() {
    assert!(matches!(
        create_sink_at(None, garbage(), Duration::ZERO, 1.0),
        Err(MediaError::OutputUnavailable(_))
    ));
}

#[test]
fn play_before_any_load_is_rejected() {
    let settings = AudioSettings {
        quit_fade_out_ms: 0,
        ..AudioSettings::default()
    };
    let (mut player, _events) = AudioPlayer::new(&settings);
    assert_eq!(player.play(), Err(MediaError::NoSource));

    let first = player.load("http://127.0.0.1:9/a.mp3");
    let second = player.load("http://127.0.0.1:9/b.mp3");
    assert!(second > first);

    player.quit_handle().quit_softly();
    assert_eq!(player.play(), Err(MediaError::Disconnected));
}
