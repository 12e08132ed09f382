use thiserror::Error;

use crate::audio::MediaError;
use crate::gateway::GatewayError;

/// Why a play request did not end with audio starting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("could not resolve stream: {0}")]
    Resolution(#[from] GatewayError),

    #[error("playback failed: {0}")]
    Playback(#[from] MediaError),

    #[error("superseded by a newer play request")]
    Superseded,

    #[error("playback engine has stopped")]
    EngineStopped,
}
