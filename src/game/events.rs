use bevy::prelude::*;

use super::types::{FadeDirection, SoundId, Slot};

/// One rhythm pulse from the beat clock.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatTick {
    pub beat: u64,
}

/// Commands emitted by the anchor controller to its visual/audio/game-state collaborators.
/// Fire-and-forget: nothing is awaited.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SwingEvent {
    AnchorSpawned {
        slot: Slot,
        position: Vec2,
    },
    AnchorRetracted {
        slot: Slot,
    },
    /// Fill the connecting segment, always from the older anchor toward the newest.
    FillSegment {
        from: Vec2,
        to: Vec2,
    },
    /// Empty the segment; `reversed` retracts it from the other end.
    EmptySegment {
        reversed: bool,
    },
    PlaySound(SoundId),
    /// Terminal: no anchor left.
    BothAnchorsLost,
}

/// Request from outside the beat loop to remove an anchor (hazards, scripted events).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseAnchor {
    pub slot: Slot,
}

/// Radius fade lifecycle notifications.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeSignal {
    Started(FadeDirection),
    Completed(FadeDirection),
}
