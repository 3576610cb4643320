use bevy::prelude::*;

use super::events::SwingEvent;
use crate::config::tuning::Tuning;

/// Where the segment is in its fill/empty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentPhase {
    #[default]
    Hidden,
    Filling,
    Full,
    Emptying,
}

/// Connecting segment between the bound anchors, animated from fill/empty commands.
#[derive(Resource, Debug, Clone)]
pub struct SegmentVisual {
    from: Vec2,
    to: Vec2,
    /// Visible fraction of `from..to`, in [0, 1].
    fill: f32,
    phase: SegmentPhase,
    reversed: bool,
    duration: f32,
}

impl SegmentVisual {
    pub fn new(duration: f32) -> Self {
        Self {
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            fill: 0.0,
            phase: SegmentPhase::Hidden,
            reversed: false,
            duration: duration.max(0.0),
        }
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
    }

    #[cfg(test)]
    pub fn phase(&self) -> SegmentPhase {
        self.phase
    }

    /// Grow from `from` toward `to`.
    pub fn fill(&mut self, from: Vec2, to: Vec2) {
        self.from = from;
        self.to = to;
        self.fill = 0.0;
        self.reversed = false;
        self.phase = SegmentPhase::Filling;
    }

    /// Shrink toward `to`, or toward `from` when reversed.
    pub fn empty(&mut self, reversed: bool) {
        if self.phase == SegmentPhase::Hidden {
            return;
        }
        self.reversed = reversed;
        self.phase = SegmentPhase::Emptying;
    }

    pub fn clear(&mut self) {
        self.fill = 0.0;
        self.phase = SegmentPhase::Hidden;
    }

    pub fn advance(&mut self, dt: f32) {
        let step = if self.duration > 0.0 {
            dt.max(0.0) / self.duration
        } else {
            1.0
        };
        match self.phase {
            SegmentPhase::Filling => {
                self.fill = (self.fill + step).min(1.0);
                if self.fill >= 1.0 {
                    self.phase = SegmentPhase::Full;
                }
            }
            SegmentPhase::Emptying => {
                self.fill = (self.fill - step).max(0.0);
                if self.fill <= 0.0 {
                    self.phase = SegmentPhase::Hidden;
                }
            }
            SegmentPhase::Hidden | SegmentPhase::Full => {}
        }
    }

    /// Currently visible span, if any.
    pub fn visible_span(&self) -> Option<(Vec2, Vec2)> {
        if self.fill <= 0.0 {
            return None;
        }
        let span = match self.phase {
            SegmentPhase::Hidden => return None,
            SegmentPhase::Filling | SegmentPhase::Full => {
                (self.from, self.from.lerp(self.to, self.fill))
            }
            SegmentPhase::Emptying if self.reversed => {
                (self.from, self.from.lerp(self.to, self.fill))
            }
            SegmentPhase::Emptying => (self.to.lerp(self.from, self.fill), self.to),
        };
        Some(span)
    }
}

impl FromWorld for SegmentVisual {
    fn from_world(world: &mut World) -> Self {
        let tuning = world.get_resource::<Tuning>().cloned().unwrap_or_default();
        Self::new(tuning.segment_fill_duration)
    }
}

/// Consume fill/empty commands and animate the segment.
pub fn drive_segment(
    time: Res<Time>,
    mut events: MessageReader<SwingEvent>,
    mut segment: ResMut<SegmentVisual>,
) {
    for event in events.read() {
        match event {
            SwingEvent::FillSegment { from, to } => segment.fill(*from, *to),
            SwingEvent::EmptySegment { reversed } => segment.empty(*reversed),
            _ => {}
        }
    }
    segment.advance(time.delta_secs());
}
