use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::sync::{Notify, watch};

use super::*;
use crate::engine::PlaybackState;
use crate::gateway::fake::FakeGateway;
use crate::gateway::{CatalogueGateway, GatewayError};
use crate::model::{Track, TrackId};

fn line(time: f64, text: &str) -> LyricLine {
    LyricLine {
        time,
        text: text.to_string(),
    }
}

fn lines_at(times: &[f64]) -> Vec<LyricLine> {
    times.iter().map(|&t| line(t, &format!("at {t}"))).collect()
}

#[test]
fn parses_centisecond_timestamps() {
    let lines = parse_lrc("[00:01.50]Hello\n[00:03.00]World");
    assert_eq!(lines, vec![line(1.5, "Hello"), line(3.0, "World")]);
}

#[test]
fn parses_millisecond_timestamps_and_long_minutes() {
    let lines = parse_lrc("[01:02.345]one\n[120:00.001]late");
    assert_eq!(lines.len(), 2);
    assert!((lines[0].time - 62.345).abs() < 1e-9);
    assert!((lines[1].time - 7200.001).abs() < 1e-9);
}

#[test]
fn empty_input_yields_placeholder() {
    let lines = parse_lrc("");
    assert_eq!(lines, vec![line(0.0, NO_LYRICS)]);
    assert!(lines[0].is_placeholder());
}

#[test]
fn untimed_lines_are_dropped() {
    let lines = parse_lrc("just text\n[00:05.00]kept\n[ar:Someone]\n[00:06.00]   ");
    assert_eq!(lines, vec![line(5.0, "kept")]);

    assert_eq!(parse_lrc("just text"), no_lyrics());
}

#[test]
fn timestamps_only_count_at_line_start() {
    assert_eq!(parse_lrc("just text [00:05.00]"), no_lyrics());

    let lines = parse_lrc("hello [00:07.00]world
[00:08.00]at [00:09.00] once");
    assert_eq!(lines, vec![line(8.0, "at [00:09.00] once")]);
}

#[test]
fn repeated_timestamps_share_text_and_output_is_sorted() {
    let lines = parse_lrc("[00:30.00]second\n[00:10.00][00:50.00] chorus \n[00:20.00]first");
    let got: Vec<(f64, &str)> = lines.iter().map(|l| (l.time, l.text.as_str())).collect();
    assert_eq!(
        got,
        vec![
            (10.0, "chorus"),
            (20.0, "first"),
            (30.0, "second"),
            (50.0, "chorus"),
        ]
    );
}

#[test]
fn handles_crlf_line_endings() {
    let lines = parse_lrc("[00:01.00]a\r\n[00:02.00]b\r\n");
    assert_eq!(lines, vec![line(1.0, "a"), line(2.0, "b")]);
}

#[test]
fn active_index_picks_last_started_line() {
    let lines = lines_at(&[0.0, 10.0, 20.0]);
    assert_eq!(active_index(&lines, 15.0), Some(1));
    assert_eq!(active_index(&lines, 25.0), Some(2));
    assert_eq!(active_index(&lines, 10.0), Some(1));
    assert_eq!(active_index(&lines, 0.0), Some(0));
    assert_eq!(active_index(&lines, -1.0), None);
    assert_eq!(active_index(&[], 5.0), None);
}

#[test]
fn sync_signals_only_on_change() {
    let lines = lines_at(&[0.0, 10.0, 20.0]);
    let mut sync = LyricSync::new(Duration::from_secs(3));
    let now = Instant::now();

    assert_eq!(sync.update(&lines, 1.0, now), Some(0));
    assert_eq!(sync.update(&lines, 2.0, now), None);
    assert_eq!(sync.update(&lines, 11.0, now), Some(1));
    assert_eq!(sync.update(&lines, 11.5, now), None);
    assert_eq!(sync.active(), Some(1));
}

#[test]
fn scrubbing_holds_autoscroll_until_it_ends() {
    let lines = lines_at(&[0.0, 10.0, 20.0, 30.0]);
    let mut sync = LyricSync::new(Duration::from_secs(3));
    let now = Instant::now();
    sync.update(&lines, 1.0, now);

    sync.scrub_by(2, lines.len(), now);
    assert!(sync.is_scrubbing());
    assert_eq!(sync.scrub_cursor(), Some(2));
    assert_eq!(sync.update(&lines, 12.0, now), None);
    assert_eq!(sync.active(), Some(1));

    sync.scrub_by(5, lines.len(), now);
    assert_eq!(sync.scrub_cursor(), Some(3));
    sync.scrub_by(-9, lines.len(), now);
    assert_eq!(sync.scrub_cursor(), Some(0));

    sync.end_scrub();
    assert!(!sync.is_scrubbing());
    assert_eq!(sync.update(&lines, 12.5, now), Some(1));
}

#[test]
fn idle_scrub_times_out() {
    let lines = lines_at(&[0.0, 10.0]);
    let mut sync = LyricSync::new(Duration::from_millis(500));
    let start = Instant::now();
    sync.update(&lines, 1.0, start);
    sync.scrub_by(1, lines.len(), start);

    assert_eq!(sync.update(&lines, 2.0, start + Duration::from_millis(100)), None);
    assert!(sync.is_scrubbing());

    assert_eq!(sync.update(&lines, 2.0, start + Duration::from_secs(1)), Some(0));
    assert!(!sync.is_scrubbing());
}

#[test]
fn committing_a_scrub_returns_its_line() {
    let lines = lines_at(&[0.0, 10.0, 20.0]);
    let mut sync = LyricSync::new(Duration::from_secs(3));
    let now = Instant::now();
    assert_eq!(sync.commit_scrub(), None);

    sync.scrub_by(1, lines.len(), now);
    assert_eq!(sync.commit_scrub(), Some(1));
    assert!(!sync.is_scrubbing());
}

fn playing(id: u64) -> PlaybackState {
    PlaybackState {
        current_track: Some(Track::new(id, "t")),
        ..PlaybackState::default()
    }
}

#[tokio::test]
async fn loader_publishes_lyrics_for_current_track() {
    let gateway = Arc::new(FakeGateway::new().with_lyric(1, "[00:01.00]hi"));
    let (state_tx, state_rx) = watch::channel(PlaybackState::default());
    let (mut docs, join) = spawn_lyric_loader(gateway.clone(), state_rx);

    state_tx.send_replace(playing(1));
    docs.changed().await.unwrap();
    let doc = docs.borrow_and_update().clone();
    assert_eq!(doc.track_id, Some(1));
    assert_eq!(doc.lines, vec![line(1.0, "hi")]);

    // Progress-only updates do not refetch.
    let mut again = playing(1);
    again.progress = 30.0;
    state_tx.send_replace(again);

    state_tx.send_replace(playing(2));
    docs.changed().await.unwrap();
    let doc = docs.borrow_and_update().clone();
    assert_eq!(doc.track_id, Some(2));
    assert_eq!(doc.lines, no_lyrics());

    assert_eq!(gateway.lyric_calls(), vec![1, 2]);

    drop(state_tx);
    join.await.unwrap();
}

#[tokio::test]
async fn loader_clears_document_when_nothing_plays() {
    let gateway = Arc::new(FakeGateway::new().with_lyric(4, "[00:01.00]x"));
    let (state_tx, state_rx) = watch::channel(playing(4));
    let (mut docs, _join) = spawn_lyric_loader(gateway, state_rx);

    docs.changed().await.unwrap();
    assert_eq!(docs.borrow_and_update().track_id, Some(4));

    state_tx.send_replace(PlaybackState::default());
    docs.changed().await.unwrap();
    assert_eq!(*docs.borrow(), LyricDocument::default());
}

/// Lyric fetches that announce themselves and then wait to be released.
struct GatedLyrics {
    started: UnboundedSender<TrackId>,
    release: Notify,
}

#[async_trait]
impl CatalogueGateway for GatedLyrics {
    async fn resolve_stream_url(&self, id: TrackId) -> Result<String, GatewayError> {
        Err(GatewayError::NotFound(id))
    }

    async fn fetch_lyric(&self, id: TrackId) -> Result<String, GatewayError> {
        let _ = self.started.send(id);
        self.release.notified().await;
        Ok(format!("[00:01.00]lyric {id}"))
    }
}

#[tokio::test]
async fn loader_drops_lyrics_that_arrive_after_the_track_changed() {
    let (started_tx, mut started) = unbounded_channel();
    let gateway = Arc::new(GatedLyrics {
        started: started_tx,
        release: Notify::new(),
    });
    let (state_tx, state_rx) = watch::channel(PlaybackState::default());
    let (mut docs, _join) = spawn_lyric_loader(gateway.clone(), state_rx);

    state_tx.send_replace(playing(1));
    assert_eq!(started.recv().await, Some(1));

    state_tx.send_replace(playing(2));
    gateway.release.notify_one();
    assert_eq!(started.recv().await, Some(2));
    assert!(!docs.has_changed().unwrap());

    gateway.release.notify_one();
    docs.changed().await.unwrap();
    let doc = docs.borrow_and_update().clone();
    assert_eq!(doc.track_id, Some(2));
    assert_eq!(doc.lines, vec![line(1.0, "lyric 2")]);
}
