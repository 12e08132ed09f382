use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use super::fetch::{build_client, fetch_stream};
use super::sink::{create_sink_at, source_duration};
use super::stopwatch::Stopwatch;
use super::types::{AudioCmd, MediaError, MediaEvent, MediaEventKind, SourceId};

/// The one source the audio thread currently owns.
struct ActiveSource {
    id: SourceId,
    bytes: Option<Arc<[u8]>>,
    sink: Option<Sink>,
    /// Seek requested before the bytes arrived.
    pending_seek: Option<Duration>,
    /// Caller wants audio; honoured once the sink exists.
    want_playing: bool,
    ended: bool,
    failed: bool,
}

impl ActiveSource {
    fn new(id: SourceId) -> Self {
        Self {
            id,
            bytes: None,
            sink: None,
            pending_seek: None,
            want_playing: false,
            ended: false,
            failed: false,
        }
    }
}

struct AudioThread {
    stream: Option<OutputStream>,
    http: Option<reqwest::blocking::Client>,
    cmd_tx: Sender<AudioCmd>,
    events: UnboundedSender<MediaEvent>,
    active: Option<ActiveSource>,
    clock: Stopwatch,
    volume: f32,
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    cmd_tx: Sender<AudioCmd>,
    events: UnboundedSender<MediaEvent>,
    volume: f32,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "No audio output device");
                None
            }
        };

        let http = match build_client() {
            Ok(c) => Some(c),
            Err(e) => {
                error!(error = %e, "Failed to build stream client");
                None
            }
        };

        let mut audio = AudioThread {
            stream,
            http,
            cmd_tx,
            events,
            active: None,
            clock: Stopwatch::default(),
            volume,
        };

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    audio.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => audio.handle(cmd),
                Err(RecvTimeoutError::Timeout) => audio.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

impl AudioThread {
    fn emit(&self, source: SourceId, kind: MediaEventKind) {
        let _ = self.events.send(MediaEvent { source, kind });
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { source, url } => self.load(source, url),
            AudioCmd::Loaded { source, result } => self.loaded(source, result),
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Seek(position) => self.seek(position),
            AudioCmd::SetVolume(volume) => {
                self.volume = volume;
                if let Some(sink) = self.active.as_ref().and_then(|a| a.sink.as_ref()) {
                    sink.set_volume(volume);
                }
            }
            AudioCmd::Quit { .. } => {}
        }
    }

    fn load(&mut self, source: SourceId, url: String) {
        if let Some(sink) = self.active.take().and_then(|a| a.sink) {
            sink.stop();
        }
        self.clock = Stopwatch::default();
        self.active = Some(ActiveSource::new(source));
        debug!(source, "Loading stream");

        let Some(client) = self.http.clone() else {
            let err = MediaError::Fetch("no HTTP client".to_string());
            let _ = self.cmd_tx.send(AudioCmd::Loaded {
                source,
                result: Err(err),
            });
            return;
        };
        let tx = self.cmd_tx.clone();
        thread::spawn(move || {
            let result = fetch_stream(&client, &url);
            let _ = tx.send(AudioCmd::Loaded { source, result });
        });
    }

    fn loaded(&mut self, source: SourceId, result: Result<Arc<[u8]>, MediaError>) {
        let Some(active) = self.active.as_mut().filter(|a| a.id == source) else {
            debug!(source, "Dropping bytes for a replaced source");
            return;
        };

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(source, error = %e, "Stream fetch failed");
                active.failed = true;
                self.emit(source, MediaEventKind::Error(e));
                return;
            }
        };

        let start_at = active.pending_seek.take().unwrap_or(Duration::ZERO);
        match create_sink_at(self.stream.as_ref(), bytes.clone(), start_at, self.volume) {
            Ok(sink) => {
                let duration = source_duration(&bytes);
                active.bytes = Some(bytes);
                self.clock.reset_to(start_at);
                if active.want_playing {
                    sink.play();
                    self.clock.start();
                }
                active.sink = Some(sink);
                if let Some(d) = duration {
                    self.emit(source, MediaEventKind::DurationKnown(d.as_secs_f64()));
                }
            }
            Err(e) => {
                warn!(source, error = %e, "Stream could not be played");
                active.failed = true;
                self.emit(source, MediaEventKind::Error(e));
            }
        }
    }

    fn play(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let source = active.id;
        if active.failed {
            self.emit(source, MediaEventKind::Error(MediaError::NoSource));
            return;
        }
        active.want_playing = true;

        if active.ended {
            // Like an HTML audio element: play after the end starts over.
            active.ended = false;
            if let Some(bytes) = active.bytes.clone() {
                match create_sink_at(self.stream.as_ref(), bytes, Duration::ZERO, self.volume) {
                    Ok(sink) => active.sink = Some(sink),
                    Err(e) => {
                        active.failed = true;
                        self.emit(source, MediaEventKind::Error(e));
                        return;
                    }
                }
            }
            self.clock = Stopwatch::default();
        }

        if let Some(sink) = active.sink.as_ref() {
            sink.play();
            self.clock.start();
        }
    }

    fn pause(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.want_playing = false;
            if let Some(sink) = active.sink.as_ref() {
                sink.pause();
            }
        }
        self.clock.pause();
    }

    fn seek(&mut self, position: Duration) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let source = active.id;
        let Some(bytes) = active.bytes.clone() else {
            active.pending_seek = Some(position);
            self.emit(source, MediaEventKind::Seeked);
            return;
        };

        // Rebuild the sink and skip into the buffered stream.
        if let Some(old) = active.sink.take() {
            old.stop();
        }
        match create_sink_at(self.stream.as_ref(), bytes, position, self.volume) {
            Ok(sink) => {
                active.ended = false;
                if active.want_playing {
                    sink.play();
                }
                active.sink = Some(sink);
                self.clock.reset_to(position);
                if active.want_playing {
                    self.clock.start();
                }
                self.emit(source, MediaEventKind::Seeked);
            }
            Err(e) => {
                active.failed = true;
                self.clock.pause();
                self.emit(source, MediaEventKind::Error(e));
            }
        }
    }

    fn tick(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(sink) = active.sink.as_ref() else {
            return;
        };
        if !self.clock.is_running() || active.ended {
            return;
        }

        let source = active.id;
        if sink.empty() {
            active.ended = true;
            active.want_playing = false;
            self.clock.pause();
            debug!(source, "Source ended");
            self.emit(source, MediaEventKind::Ended);
        } else {
            let elapsed = self.clock.elapsed().as_secs_f64();
            self.emit(source, MediaEventKind::TimeUpdate(elapsed));
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(sink) = self.active.take().and_then(|a| a.sink) {
            // Fade out gently before stopping.
            fade_out_sink(&sink, self.volume, fade_out_ms);
            sink.stop();
        }
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
