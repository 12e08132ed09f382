//! Catalogue gateway: stream URL and lyric resolution plus catalogue queries.
//!
//! The playback core only depends on [`CatalogueGateway`]; [`NeteaseClient`]
//! is the HTTP implementation used by the binary.

mod error;
mod netease;
mod responses;

use async_trait::async_trait;

use crate::model::TrackId;

pub use error::GatewayError;
pub use netease::{NeteaseClient, SearchResults};

/// What the playback core needs from the catalogue service.
#[async_trait]
pub trait CatalogueGateway: Send + Sync {
    /// Resolve a playable stream URL for `id`.
    ///
    /// Fails with [`GatewayError::NotFound`] when the service has no URL for it.
    async fn resolve_stream_url(&self, id: TrackId) -> Result<String, GatewayError>;

    /// Fetch the raw timestamped lyric text for `id` (may be empty).
    async fn fetch_lyric(&self, id: TrackId) -> Result<String, GatewayError>;
}

#[cfg(test)]
pub(crate) mod fake;
