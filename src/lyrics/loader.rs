use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::PlaybackState;
use crate::gateway::CatalogueGateway;
use crate::model::TrackId;

use super::parser::{LyricLine, no_lyrics, parse_lrc};

/// Parsed lyrics for one track. Empty when nothing is playing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricDocument {
    pub track_id: Option<TrackId>,
    pub lines: Vec<LyricLine>,
}

/// Fetch and parse lyrics whenever the playing track changes.
///
/// A document is published only if its track is still the current one once
/// the fetch completes. The task ends when the engine's state sender goes away.
pub fn spawn_lyric_loader(
    gateway: Arc<dyn CatalogueGateway>,
    mut playback: watch::Receiver<PlaybackState>,
) -> (watch::Receiver<LyricDocument>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(LyricDocument::default());

    let join = tokio::spawn(async move {
        let mut shown: Option<TrackId> = None;
        loop {
            let current = playback.borrow_and_update().current_id();
            if current != shown {
                shown = current;
                let doc = match current {
                    None => LyricDocument::default(),
                    Some(id) => {
                        let lines = load_lines(gateway.as_ref(), id).await;
                        if playback.borrow().current_id() != Some(id) {
                            debug!(track_id = id, "Discarding lyrics for previous track");
                            continue;
                        }
                        LyricDocument {
                            track_id: Some(id),
                            lines,
                        }
                    }
                };
                tx.send_replace(doc);
            }

            if playback.changed().await.is_err() {
                break;
            }
        }
    });

    (rx, join)
}

async fn load_lines(gateway: &dyn CatalogueGateway, id: TrackId) -> Vec<LyricLine> {
    match gateway.fetch_lyric(id).await {
        Ok(raw) => parse_lrc(&raw),
        Err(e) => {
            warn!(track_id = id, error = %e, "Could not fetch lyrics");
            no_lyrics()
        }
    }
}
