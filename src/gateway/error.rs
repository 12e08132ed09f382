use thiserror::Error;

use crate::model::TrackId;

/// Catalogue gateway errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("no playable stream for track {0}")]
    NotFound(TrackId),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("service error {0}: {1}")]
    Service(i64, String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
