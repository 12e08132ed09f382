//! In-memory gateway for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CatalogueGateway, GatewayError};
use crate::model::TrackId;

/// Resolves every id to a predictable URL unless told otherwise, and counts calls.
#[derive(Default)]
pub(crate) struct FakeGateway {
    missing: HashSet<TrackId>,
    lyrics: HashMap<TrackId, String>,
    url_calls: Mutex<Vec<TrackId>>,
    lyric_calls: Mutex<Vec<TrackId>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn without_stream(mut self, id: TrackId) -> Self {
        self.missing.insert(id);
        self
    }

    pub(crate) fn with_lyric(mut self, id: TrackId, text: &str) -> Self {
        self.lyrics.insert(id, text.to_string());
        self
    }

    pub(crate) fn url_for(id: TrackId) -> String {
        format!("https://cdn.test/{id}.mp3")
    }

    pub(crate) fn url_calls(&self, id: TrackId) -> usize {
        self.url_calls
            .lock()
            .map(|calls| calls.iter().filter(|&&c| c == id).count())
            .unwrap_or(0)
    }

    pub(crate) fn total_url_calls(&self) -> usize {
        self.url_calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    pub(crate) fn lyric_calls(&self) -> Vec<TrackId> {
        self.lyric_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogueGateway for FakeGateway {
    async fn resolve_stream_url(&self, id: TrackId) -> Result<String, GatewayError> {
        if let Ok(mut calls) = self.url_calls.lock() {
            calls.push(id);
        }
        if self.missing.contains(&id) {
            return Err(GatewayError::NotFound(id));
        }
        Ok(Self::url_for(id))
    }

    async fn fetch_lyric(&self, id: TrackId) -> Result<String, GatewayError> {
        if let Ok(mut calls) = self.lyric_calls.lock() {
            calls.push(id);
        }
        self.lyrics
            .get(&id)
            .cloned()
            .ok_or(GatewayError::NotFound(id))
    }
}
