use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::audio::{MediaClock, MediaEvent};
use crate::gateway::CatalogueGateway;
use crate::model::Track;

use super::core::{EngineOptions, PlayReply, PlaybackEngine, Resolved};
use super::error::EngineError;
use super::state::PlaybackState;

/// Requests accepted by the engine task.
#[derive(Debug)]
pub enum EngineCmd {
    Play {
        track: Track,
        queue: Option<Vec<Track>>,
        reply: Option<PlayReply>,
    },
    TogglePlay,
    Seek(f64),
    SetVolume(f32),
    Next,
    Prev,
    Shutdown,
}

/// Cloneable front door to a running engine task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: UnboundedSender<EngineCmd>,
    state: watch::Receiver<PlaybackState>,
}

/// Run `clock` under a [`PlaybackEngine`] on its own tokio task.
pub fn spawn_engine<C: MediaClock>(
    clock: C,
    media_events: UnboundedReceiver<MediaEvent>,
    gateway: Arc<dyn CatalogueGateway>,
    options: EngineOptions,
) -> (EngineHandle, JoinHandle<()>) {
    let (engine, channels) = PlaybackEngine::new(clock, gateway, options);
    let (tx, rx) = unbounded_channel();

    let handle = EngineHandle {
        tx,
        state: channels.state,
    };
    let join = tokio::spawn(run(engine, rx, media_events, channels.resolved));
    (handle, join)
}

async fn run<C: MediaClock>(
    mut engine: PlaybackEngine<C>,
    mut commands: UnboundedReceiver<EngineCmd>,
    mut media_events: UnboundedReceiver<MediaEvent>,
    mut resolved: UnboundedReceiver<Resolved>,
) {
    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(EngineCmd::Shutdown) | None => break,
                Some(cmd) => dispatch(&mut engine, cmd),
            },
            Some(event) = media_events.recv() => engine.on_media_event(event),
            Some(done) = resolved.recv() => engine.on_resolved(done),
        }
    }
    debug!("Playback engine stopped");
}

fn dispatch<C: MediaClock>(engine: &mut PlaybackEngine<C>, cmd: EngineCmd) {
    match cmd {
        EngineCmd::Play {
            track,
            queue,
            reply,
        } => engine.play_track(track, queue, reply),
        EngineCmd::TogglePlay => engine.toggle_play(),
        EngineCmd::Seek(seconds) => engine.seek(seconds),
        EngineCmd::SetVolume(volume) => engine.set_volume(volume),
        EngineCmd::Next => {
            engine.next_track();
        }
        EngineCmd::Prev => engine.prev_track(),
        EngineCmd::Shutdown => {}
    }
}

impl EngineHandle {
    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            debug!("Engine command dropped; engine has stopped");
        }
    }

    /// Ask the engine to play `track`, optionally replacing the queue.
    ///
    /// The receiver resolves once audio has been asked to start, or with the
    /// reason it was not.
    pub fn play(
        &self,
        track: Track,
        queue: Option<Vec<Track>>,
    ) -> oneshot::Receiver<Result<(), EngineError>> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCmd::Play {
            track,
            queue,
            reply: Some(reply),
        });
        rx
    }

    pub async fn play_and_wait(
        &self,
        track: Track,
        queue: Option<Vec<Track>>,
    ) -> Result<(), EngineError> {
        self.play(track, queue)
            .await
            .unwrap_or(Err(EngineError::EngineStopped))
    }

    pub fn toggle_play(&self) {
        self.send(EngineCmd::TogglePlay);
    }

    pub fn seek(&self, seconds: f64) {
        self.send(EngineCmd::Seek(seconds));
    }

    pub fn set_volume(&self, volume: f32) {
        self.send(EngineCmd::SetVolume(volume));
    }

    pub fn next_track(&self) {
        self.send(EngineCmd::Next);
    }

    pub fn prev_track(&self) {
        self.send(EngineCmd::Prev);
    }

    pub fn shutdown(&self) {
        self.send(EngineCmd::Shutdown);
    }

    /// A receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.state.borrow().clone()
    }
}
