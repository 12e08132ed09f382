use crate::engine::PlaybackState;
use crate::mpris::{MprisHandle, PlaybackStatus};

/// The parts of the engine state MPRIS clients see.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MprisSnapshot {
    track_id: Option<u64>,
    status: PlaybackStatus,
    volume: f32,
    has_duration: bool,
}

impl MprisSnapshot {
    fn of(state: &PlaybackState) -> Self {
        Self {
            track_id: state.current_id(),
            status: PlaybackStatus::from_state(state),
            volume: state.volume,
            has_duration: state.duration > 0.0,
        }
    }
}

/// Push `state` to MPRIS unless nothing visible there changed since `last`.
pub fn update_mpris(mpris: &MprisHandle, state: &PlaybackState, last: &mut MprisSnapshot) {
    let snapshot = MprisSnapshot::of(state);
    if snapshot != *last {
        mpris.update(state);
        *last = snapshot;
    }
}
