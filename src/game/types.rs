
// ── Newtypes ────────────────────────────────────────────────────────

/// Visual opacity. Always clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Opacity(pub f32);

impl Opacity {
    pub const TRANSPARENT: Self = Self(0.0);
    pub const OPAQUE: Self = Self(1.0);

    pub fn new(v: f32) -> Self {
        debug_assert!(v.is_finite(), "Opacity must be finite");
        Self(v.clamp(0.0, 1.0))
    }

    pub fn is_visible(self) -> bool {
        self.0 > 0.0
    }
}

/// Beat counter (saturating).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct BeatCount(pub u64);

impl BeatCount {
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

// ── Enums ───────────────────────────────────────────────────────────

/// One of the two anchor slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Which slot was populated (or kept) most recently.
///
/// `None` exactly when both slots are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NewestMarker {
    #[default]
    None,
    A,
    B,
}

impl NewestMarker {
    pub fn slot(self) -> Option<Slot> {
        match self {
            Self::None => None,
            Self::A => Some(Slot::A),
            Self::B => Some(Slot::B),
        }
    }

    pub fn is(self, slot: Slot) -> bool {
        self.slot() == Some(slot)
    }
}

impl From<Slot> for NewestMarker {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::A => Self::A,
            Slot::B => Self::B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FadeDirection {
    In,
    Out,
}

/// How the player is currently aiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    /// Absolute world-space cursor.
    #[default]
    Pointer,
    /// Relative stick direction.
    Directional,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pointer => "Mouse",
            Self::Directional => "Gamepad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    Kick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_other_is_an_involution() {
        for slot in [Slot::A, Slot::B] {
            assert_ne!(slot.other(), slot);
            assert_eq!(slot.other().other(), slot);
        }
    }

    #[test]
    fn newest_marker_names_its_slot() {
        assert_eq!(NewestMarker::None.slot(), None);
        assert!(NewestMarker::from(Slot::B).is(Slot::B));
        assert!(!NewestMarker::from(Slot::A).is(Slot::B));
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(Opacity::new(1.7), Opacity::OPAQUE);
        assert_eq!(Opacity::new(-0.2), Opacity::TRANSPARENT);
        assert!(!Opacity::TRANSPARENT.is_visible());
    }

    #[test]
    fn beat_count_saturates() {
        assert_eq!(BeatCount(u64::MAX).next(), BeatCount(u64::MAX));
        assert_eq!(BeatCount(3).next(), BeatCount(4));
    }
}
