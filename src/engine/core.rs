use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::audio::{MediaClock, MediaEvent, MediaEventKind, SourceId};
use crate::config::Settings;
use crate::gateway::{CatalogueGateway, GatewayError};
use crate::model::{Track, TrackId};

use super::error::EngineError;
use super::state::{DEFAULT_VOLUME, PlaybackState, PlayerPhase};
use super::url_cache::UrlCache;

/// Receives the outcome of one play request.
pub type PlayReply = oneshot::Sender<Result<(), EngineError>>;

/// Tunables the engine takes from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub initial_volume: f32,
    /// Past this many elapsed seconds, "previous" restarts the current track.
    pub restart_threshold_secs: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
            restart_threshold_secs: 3.0,
        }
    }
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            initial_volume: settings.audio.initial_volume,
            restart_threshold_secs: settings.playback.restart_threshold_secs,
        }
    }
}

/// Completion of a spawned stream URL lookup.
#[derive(Debug)]
pub struct Resolved {
    pub(super) request: u64,
    pub(super) track_id: TrackId,
    pub(super) result: Result<String, GatewayError>,
}

/// Receiving ends created alongside a [`PlaybackEngine`].
pub struct EngineChannels {
    /// URL lookups finishing; feed each to [`PlaybackEngine::on_resolved`].
    pub resolved: UnboundedReceiver<Resolved>,
    pub state: watch::Receiver<PlaybackState>,
}

struct PendingPlay {
    request: u64,
    track: Track,
    reply: Option<PlayReply>,
}

struct LoadedSource {
    id: SourceId,
    url: String,
    /// Seeks sent to the clock and not yet acknowledged with `Seeked`.
    pending_seeks: u32,
}

#[derive(Clone, Copy)]
enum Step {
    Next,
    Prev,
}

/// Queue, URL cache and playback state driving one [`MediaClock`].
///
/// Every method runs to completion without awaiting; gateway lookups are
/// spawned onto the tokio runtime and come back through
/// [`EngineChannels::resolved`]. Only the most recent play request may commit.
pub struct PlaybackEngine<C: MediaClock> {
    clock: C,
    gateway: Arc<dyn CatalogueGateway>,
    queue: Vec<Track>,
    urls: UrlCache,
    state: PlaybackState,
    loaded: Option<LoadedSource>,
    latest_request: u64,
    pending: Option<PendingPlay>,
    restart_threshold: f64,
    resolved_tx: UnboundedSender<Resolved>,
    state_tx: watch::Sender<PlaybackState>,
}

impl<C: MediaClock> PlaybackEngine<C> {
    pub fn new(
        mut clock: C,
        gateway: Arc<dyn CatalogueGateway>,
        options: EngineOptions,
    ) -> (Self, EngineChannels) {
        let volume = options.initial_volume.clamp(0.0, 1.0);
        clock.set_volume(volume);

        let state = PlaybackState::new(volume);
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (resolved_tx, resolved_rx) = unbounded_channel();

        let engine = Self {
            clock,
            gateway,
            queue: Vec::new(),
            urls: UrlCache::default(),
            state,
            loaded: None,
            latest_request: 0,
            pending: None,
            restart_threshold: options.restart_threshold_secs,
            resolved_tx,
            state_tx,
        };
        let channels = EngineChannels {
            resolved: resolved_rx,
            state: state_rx,
        };
        (engine, channels)
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn url_cache(&self) -> &UrlCache {
        &self.urls
    }

    /// Id of the source currently handed to the media clock.
    pub fn loaded_source(&self) -> Option<SourceId> {
        self.loaded.as_ref().map(|l| l.id)
    }

    /// Whether a gateway lookup for the latest play request is outstanding.
    pub fn is_resolving(&self) -> bool {
        self.pending.is_some()
    }

    /// Start playing `track`, replacing the queue first when one is given.
    ///
    /// Uses the URL attached to the track, then the cache, and only then asks
    /// the gateway. Any earlier request still waiting on the gateway is
    /// superseded and its reply receives [`EngineError::Superseded`].
    pub fn play_track(&mut self, track: Track, queue: Option<Vec<Track>>, reply: Option<PlayReply>) {
        if let Some(queue) = queue {
            self.queue = queue;
        }

        self.latest_request += 1;
        let request = self.latest_request;
        if let Some(old) = self.pending.take() {
            debug!(track_id = old.track.id, "Play request superseded");
            if let Some(reply) = old.reply {
                let _ = reply.send(Err(EngineError::Superseded));
            }
        }

        if let Some(url) = track.url.clone() {
            self.commit(track, url, false, reply);
            return;
        }
        if let Some(url) = self.urls.get(track.id).map(str::to_string) {
            debug!(track_id = track.id, "Stream URL cache hit");
            self.commit(track, url, true, reply);
            return;
        }

        debug!(track_id = track.id, request, "Resolving stream URL");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.resolved_tx.clone();
        let track_id = track.id;
        tokio::spawn(async move {
            let result = gateway.resolve_stream_url(track_id).await;
            let _ = tx.send(Resolved {
                request,
                track_id,
                result,
            });
        });
        self.pending = Some(PendingPlay {
            request,
            track,
            reply,
        });
    }

    /// Apply a finished URL lookup. Results for superseded requests are dropped.
    pub fn on_resolved(&mut self, resolved: Resolved) {
        let Resolved {
            request,
            track_id,
            result,
        } = resolved;

        if request != self.latest_request {
            debug!(track_id, request, "Discarding stale stream URL");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match result {
            Ok(url) => self.commit(pending.track, url, false, pending.reply),
            Err(e) => {
                warn!(track_id, error = %e, "Could not resolve stream URL");
                if let Some(reply) = pending.reply {
                    let _ = reply.send(Err(EngineError::Resolution(e)));
                }
            }
        }
    }

    fn commit(&mut self, track: Track, url: String, from_cache: bool, reply: Option<PlayReply>) {
        if !from_cache {
            self.urls.insert(track.id, url.clone());
        }

        let reuse = self.state.phase != PlayerPhase::Errored
            && self.loaded.as_ref().is_some_and(|l| l.url == url);
        if reuse {
            if self.state.phase == PlayerPhase::Ended {
                self.seek_clock(Duration::ZERO);
                self.state.progress = 0.0;
            }
        } else {
            let id = self.clock.load(&url);
            self.loaded = Some(LoadedSource {
                id,
                url: url.clone(),
                pending_seeks: 0,
            });
            self.state.progress = 0.0;
            self.state.duration = 0.0;
        }

        let track_id = track.id;
        info!(track_id, name = %track.name, "Now playing");
        self.state.current_track = Some(track.with_url(url));

        let result = match self.clock.play() {
            Ok(()) => {
                self.state.playing = true;
                self.state.phase = if reuse && self.state.phase != PlayerPhase::Loading {
                    PlayerPhase::Playing
                } else {
                    PlayerPhase::Loading
                };
                Ok(())
            }
            Err(e) => {
                warn!(track_id, error = %e, "Media clock refused to start");
                self.state.playing = false;
                self.state.phase = PlayerPhase::Errored;
                self.urls.evict(track_id);
                Err(EngineError::Playback(e))
            }
        };

        self.publish();
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    /// Pause or resume the current track. Retries resolution after an error.
    pub fn toggle_play(&mut self) {
        let Some(track) = self.state.current_track.clone() else {
            return;
        };

        if self.state.phase == PlayerPhase::Errored {
            self.play_track(track.without_url(), None, None);
            return;
        }

        if self.state.playing {
            self.clock.pause();
            self.state.playing = false;
            self.state.phase = PlayerPhase::Paused;
        } else {
            match self.clock.play() {
                Ok(()) => {
                    self.state.playing = true;
                    if self.state.phase != PlayerPhase::Loading {
                        self.state.phase = PlayerPhase::Playing;
                    }
                }
                Err(e) => {
                    warn!(track_id = track.id, error = %e, "Could not resume playback");
                    self.state.playing = false;
                }
            }
        }
        self.publish();
    }

    /// Jump to `seconds` in the current track. Negative targets clamp to 0.
    pub fn seek(&mut self, seconds: f64) {
        if seconds.is_nan() {
            warn!("Ignoring NaN seek target");
            return;
        }
        let target = seconds.max(0.0);
        let Ok(position) = Duration::try_from_secs_f64(target) else {
            warn!(seconds, "Ignoring invalid seek target");
            return;
        };
        self.seek_clock(position);
        self.state.progress = target;
        if self.state.phase == PlayerPhase::Ended {
            self.state.phase = PlayerPhase::Paused;
        }
        self.publish();
    }

    /// Set output level, clamped to 0.0..=1.0. Persists across tracks.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.clock.set_volume(volume);
        self.state.volume = volume;
        self.publish();
    }

    /// Play the track after the current one, wrapping at the end of the queue.
    ///
    /// Returns false when there is nothing to advance to.
    pub fn next_track(&mut self) -> bool {
        match self.neighbour(Step::Next) {
            Some(track) => {
                self.play_track(track, None, None);
                true
            }
            None => false,
        }
    }

    /// Restart the current track if it is past the restart threshold,
    /// otherwise play the one before it, wrapping at the start of the queue.
    pub fn prev_track(&mut self) {
        if self.state.current_track.is_none() || self.queue.is_empty() {
            return;
        }
        if self.state.progress > self.restart_threshold {
            self.seek(0.0);
            return;
        }
        if let Some(track) = self.neighbour(Step::Prev) {
            self.play_track(track, None, None);
        }
    }

    fn neighbour(&self, step: Step) -> Option<Track> {
        let current = self.state.current_track.as_ref()?;
        let len = self.queue.len();
        if len == 0 {
            return None;
        }

        let index = self.queue.iter().position(|t| t.id == current.id);
        let target = match (step, index) {
            (Step::Next, Some(i)) => (i + 1) % len,
            (Step::Prev, Some(i)) => (i + len - 1) % len,
            (Step::Next, None) => 0,
            (Step::Prev, None) => len - 1,
        };
        self.queue.get(target).cloned()
    }

    fn seek_clock(&mut self, position: Duration) {
        self.clock.seek(position);
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.pending_seeks += 1;
        }
    }

    /// Apply an event from the media clock. Events from replaced sources are ignored.
    ///
    /// Time updates are held back while a seek is unacknowledged so a tick
    /// taken before the seek cannot move progress back to the old position.
    pub fn on_media_event(&mut self, event: MediaEvent) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        if event.source != loaded.id {
            debug!(source = event.source, "Ignoring event from replaced source");
            return;
        }

        match event.kind {
            MediaEventKind::Seeked => {
                loaded.pending_seeks = loaded.pending_seeks.saturating_sub(1);
                return;
            }
            MediaEventKind::TimeUpdate(seconds) => {
                if loaded.pending_seeks > 0 {
                    debug!(seconds, "Ignoring time update from before a seek");
                    return;
                }
                self.state.progress = seconds;
                self.leave_loading();
            }
            MediaEventKind::DurationKnown(seconds) => {
                self.state.duration = seconds;
                self.leave_loading();
            }
            MediaEventKind::Ended => {
                self.state.playing = false;
                self.state.phase = PlayerPhase::Ended;
                self.publish();
                if !self.next_track() {
                    self.state.phase = PlayerPhase::Idle;
                }
            }
            MediaEventKind::Error(e) => {
                let track_id = self.state.current_id();
                warn!(?track_id, error = %e, "Playback failed");
                self.state.playing = false;
                self.state.phase = PlayerPhase::Errored;
                if let Some(id) = track_id {
                    self.urls.evict(id);
                }
                self.loaded = None;
            }
        }
        self.publish();
    }

    fn leave_loading(&mut self) {
        if self.state.phase == PlayerPhase::Loading {
            self.state.phase = if self.state.playing {
                PlayerPhase::Playing
            } else {
                PlayerPhase::Paused
            };
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}
