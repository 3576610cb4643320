use bevy::prelude::*;
use std::ops::Range;

use super::events::BeatTick;
use super::types::BeatCount;
use crate::config::tuning::Tuning;

/// Fixed-tempo metronome emitting one `BeatTick` per interval.
#[derive(Resource, Debug, Clone)]
pub struct BeatClock {
    interval: f32,
    accumulated: f32,
    beats: BeatCount,
    pub paused: bool,
}

impl BeatClock {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            beats: BeatCount::default(),
            paused: false,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.beat_interval())
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval;
    }

    pub fn beats(&self) -> BeatCount {
        self.beats
    }

    /// Fraction of the way to the next beat, in [0, 1).
    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        if self.interval <= 0.0 {
            return 0.0;
        }
        (self.accumulated / self.interval).clamp(0.0, 1.0)
    }

    /// Step by `dt`; returns the beat numbers that fell inside the step.
    pub fn advance(&mut self, dt: f32) -> Range<u64> {
        let first = self.beats.next().0;
        if self.paused || self.interval <= 0.0 {
            return first..first;
        }

        self.accumulated += dt.max(0.0);
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            self.beats = self.beats.next();
        }
        first..self.beats.next().0
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
        self.beats = BeatCount::default();
    }
}

impl FromWorld for BeatClock {
    fn from_world(world: &mut World) -> Self {
        let tuning = world.get_resource::<Tuning>().cloned().unwrap_or_default();
        Self::from_tuning(&tuning)
    }
}

pub fn tick_beat_clock(
    time: Res<Time>,
    mut clock: ResMut<BeatClock>,
    mut beats: MessageWriter<BeatTick>,
) {
    for beat in clock.advance(time.delta_secs()) {
        beats.write(BeatTick { beat });
    }
}

/// Pause/resume the beat with P or the gamepad Start button.
pub fn toggle_beat_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut clock: ResMut<BeatClock>,
) {
    let pressed = keyboard.just_pressed(KeyCode::KeyP)
        || gamepads
            .iter()
            .any(|gamepad| gamepad.just_pressed(GamepadButton::Start));
    if pressed {
        clock.paused = !clock.paused;
        info!("Beat {}", if clock.paused { "paused" } else { "resumed" });
    }
}
