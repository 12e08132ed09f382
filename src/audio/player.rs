use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use crate::config::AudioSettings;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, MediaClock, MediaError, MediaEvent, SourceId};

/// [`MediaClock`] backed by the `rodio` audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    next_source: SourceId,
    loaded: bool,
    quit: QuitHandle,
}

/// Stops the audio thread; kept by the runtime so shutdown can fade out and
/// join outside the async engine task.
#[derive(Clone)]
pub struct QuitHandle {
    tx: Sender<AudioCmd>,
    join: std::sync::Arc<Mutex<Option<JoinHandle<()>>>>,
    fade_out: Duration,
}

impl AudioPlayer {
    /// Spawn the audio thread. Media events arrive on the returned receiver.
    pub fn new(settings: &AudioSettings) -> (Self, UnboundedReceiver<MediaEvent>) {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events_rx) = unbounded_channel();

        let join = spawn_audio_thread(
            rx,
            tx.clone(),
            events_tx,
            settings.initial_volume.clamp(0.0, 1.0),
            Duration::from_millis(settings.tick_ms.max(1)),
        );

        let quit = QuitHandle {
            tx: tx.clone(),
            join: std::sync::Arc::new(Mutex::new(Some(join))),
            fade_out: Duration::from_millis(settings.quit_fade_out_ms),
        };

        let player = Self {
            tx,
            next_source: 0,
            loaded: false,
            quit,
        };
        (player, events_rx)
    }

    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), MediaError> {
        self.tx.send(cmd).map_err(|_| MediaError::Disconnected)
    }
}

impl MediaClock for AudioPlayer {
    fn load(&mut self, url: &str) -> SourceId {
        self.next_source += 1;
        let source = self.next_source;
        self.loaded = self
            .send(AudioCmd::Load {
                source,
                url: url.to_string(),
            })
            .is_ok();
        source
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if !self.loaded {
            return Err(MediaError::NoSource);
        }
        self.send(AudioCmd::Play)
    }

    fn pause(&mut self) {
        let _ = self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        let _ = self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.send(AudioCmd::SetVolume(volume));
    }
}

impl QuitHandle {
    /// Fade out, stop and join the audio thread. Safe to call more than once.
    pub fn quit_softly(&self) {
        let _ = self.tx.send(AudioCmd::Quit {
            fade_out_ms: self.fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
