use bevy::prelude::*;

use super::types::Slot;

// ── Game phase state ────────────────────────────────────────────────

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Playing,
    Death,
}

// ── Marker components ───────────────────────────────────────────────

#[derive(Component)]
pub struct MainCamera;

/// Marker: tag all session entities for cleanup on restart.
#[derive(Component)]
pub struct InGame;

/// Visual stand-in for a planted anchor.
#[derive(Component, Debug, Clone, Copy)]
pub struct AnchorVisual {
    pub slot: Slot,
}

// ── Visual handles ──────────────────────────────────────────────────

/// Entity handle per anchor slot, so a retraction despawns exactly its visual.
#[derive(Resource, Debug, Default)]
pub struct AnchorHandles([Option<Entity>; 2]);

impl AnchorHandles {
    /// Store a new handle, returning whatever was there before.
    pub fn insert(&mut self, slot: Slot, entity: Entity) -> Option<Entity> {
        self.0[slot.index()].replace(entity)
    }

    pub fn take(&mut self, slot: Slot) -> Option<Entity> {
        self.0[slot.index()].take()
    }

    pub fn clear(&mut self) {
        self.0 = [None, None];
    }
}
