use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::watch;
use tracing::debug;

use crate::app::App;
use crate::audio::QuitHandle;
use crate::config;
use crate::engine::{EngineError, EngineHandle, PlaybackState};
use crate::lyrics::LyricDocument;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::ui;

/// Everything the loop talks to besides the terminal and the model.
pub struct Wiring {
    pub engine: EngineHandle,
    pub playback: watch::Receiver<PlaybackState>,
    pub lyrics: watch::Receiver<LyricDocument>,
    pub quit: QuitHandle,
    pub mpris: MprisHandle,
    pub control_tx: mpsc::Sender<ControlCmd>,
    pub control_rx: mpsc::Receiver<ControlCmd>,
}

struct PendingPlay {
    name: String,
    reply: oneshot::Receiver<Result<(), EngineError>>,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    last_mpris: MprisSnapshot,
    pending_plays: Vec<PendingPlay>,
}

/// Main terminal event loop: handles input, UI drawing, engine and lyric
/// updates and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    wiring: &mut Wiring,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    loop {
        if wiring.playback.has_changed().unwrap_or(false) {
            let snapshot = wiring.playback.borrow_and_update().clone();
            update_mpris(&wiring.mpris, &snapshot, &mut state.last_mpris);
            app.apply_playback(snapshot);
        }
        if wiring.lyrics.has_changed().unwrap_or(false) {
            let doc = wiring.lyrics.borrow_and_update().clone();
            app.apply_lyrics(doc);
        }
        app.tick_lyrics(Instant::now());
        collect_play_replies(app, state);

        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = wiring.control_rx.try_recv() {
            if handle_control_cmd(cmd, app, wiring, state) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, wiring, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Surface the outcome of play requests in the status box.
fn collect_play_replies(app: &mut App, state: &mut EventLoopState) {
    state.pending_plays.retain_mut(|p| match p.reply.try_recv() {
        Err(TryRecvError::Empty) => true,
        Ok(Ok(())) => {
            app.clear_status();
            false
        }
        Ok(Err(EngineError::Superseded)) => false,
        Ok(Err(e)) => {
            app.set_status(format!("Could not play {}: {e}", p.name));
            false
        }
        Err(TryRecvError::Closed) => false,
    });
}

fn play_selected(app: &mut App, wiring: &Wiring, state: &mut EventLoopState) {
    let Some(track) = app.selected_track().cloned() else {
        return;
    };
    app.follow_playback_on();
    let name = track.name.clone();
    let reply = wiring.engine.play(track, Some(app.visible_queue()));
    state.pending_plays.push(PendingPlay { name, reply });
}

fn seek_by(app: &App, wiring: &Wiring, delta: f64) {
    let playback = &app.playback;
    if playback.current_track.is_none() {
        return;
    }
    let mut target = (playback.progress + delta).max(0.0);
    if playback.duration > 0.0 {
        target = target.min(playback.duration);
    }
    wiring.engine.seek(target);
}

fn quit(wiring: &Wiring) {
    debug!("Quit requested");
    wiring.quit.quit_softly();
}

fn handle_control_cmd(
    cmd: ControlCmd,
    app: &mut App,
    wiring: &Wiring,
    state: &mut EventLoopState,
) -> bool {
    let has_track = app.playback.current_track.is_some();
    let playing = app.playback.playing;
    if !app.filter_mode && cmd != ControlCmd::Quit {
        app.follow_playback_on();
    }

    match cmd {
        ControlCmd::Quit => {
            quit(wiring);
            return true;
        }
        ControlCmd::Play if !has_track => play_selected(app, wiring, state),
        ControlCmd::Play if !playing => wiring.engine.toggle_play(),
        ControlCmd::Pause | ControlCmd::Stop if playing => wiring.engine.toggle_play(),
        ControlCmd::PlayPause if !has_track => play_selected(app, wiring, state),
        ControlCmd::PlayPause => wiring.engine.toggle_play(),
        ControlCmd::Next => wiring.engine.next_track(),
        ControlCmd::Prev => wiring.engine.prev_track(),
        ControlCmd::Play | ControlCmd::Pause | ControlCmd::Stop => {}
    }

    false
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    wiring: &Wiring,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j' | 'n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.follow_playback_off();
                app.next();
            }
            KeyCode::Char('k' | 'p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.follow_playback_off();
                app.prev();
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                if app.display_indices().is_empty() {
                    return false;
                }
                app.exit_filter_mode();
                play_selected(app, wiring, state);
            }
            _ => {}
        }

        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    let scrub = settings.controls.scrub_seconds as f64;
    let step = settings.controls.volume_step;

    match key.code {
        KeyCode::Char('q') => {
            quit(wiring);
            return true;
        }
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                if let Some(&first) = app.display_indices().first() {
                    app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            if let Some(&last) = app.display_indices().last() {
                app.follow_playback_off();
                app.set_selected(last);
            }
        }
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char('J') if app.lyric_view => app.scrub_lyrics(1, Instant::now()),
        KeyCode::Char('K') if app.lyric_view => app.scrub_lyrics(-1, Instant::now()),
        KeyCode::Esc => app.lyric_sync.end_scrub(),
        KeyCode::Enter => {
            if app.lyric_view && app.lyric_sync.is_scrubbing() {
                if let Some(time) = app.commit_lyric_scrub() {
                    wiring.engine.seek(time);
                }
            } else if app.has_tracks() {
                let selected_id = app.selected_track().map(|t| t.id);
                let is_playing_selected =
                    app.playback.playing && selected_id == app.playback.current_id();
                if !is_playing_selected {
                    play_selected(app, wiring, state);
                }
            }
        }
        KeyCode::Char('p' | ' ') => {
            let _ = wiring.control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = wiring.control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = wiring.control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => seek_by(app, wiring, scrub),
        KeyCode::Char('H') => seek_by(app, wiring, -scrub),
        KeyCode::Char('+' | '=') => wiring.engine.set_volume(app.playback.volume + step),
        KeyCode::Char('-') => wiring.engine.set_volume(app.playback.volume - step),
        KeyCode::Char('v') => app.toggle_lyric_view(),
        KeyCode::Char('i') => app.toggle_metadata_window(),
        _ => {}
    }

    false
}
