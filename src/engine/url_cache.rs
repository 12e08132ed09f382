use std::collections::HashMap;

use crate::model::TrackId;

/// Previously resolved stream URLs by track id.
///
/// Entries are added on successful resolution and evicted when playback of
/// that id fails. A miss is never an error.
#[derive(Debug, Default)]
pub struct UrlCache {
    urls: HashMap<TrackId, String>,
}

impl UrlCache {
    pub fn get(&self, id: TrackId) -> Option<&str> {
        self.urls.get(&id).map(String::as_str)
    }

    pub fn insert(&mut self, id: TrackId, url: String) {
        self.urls.insert(id, url);
    }

    pub fn evict(&mut self, id: TrackId) -> bool {
        self.urls.remove(&id).is_some()
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.urls.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
