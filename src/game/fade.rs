use bevy::prelude::*;

use super::events::FadeSignal;
use super::types::{FadeDirection, Opacity};
use crate::config::tuning::Tuning;

/// Hermite smoothstep from `from` to `to`. `t` is clamped to [0, 1]; `t == 1` yields `to` exactly.
pub fn smoothstep(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let t = t * t * (3.0 - 2.0 * t);
    to * t + from * (1.0 - t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FadeRun {
    direction: FadeDirection,
    start_radius: f32,
    start_opacity: f32,
    elapsed: f32,
}

/// Single-slot radius/opacity interpolation. A new fade overwrites the running one.
#[derive(Resource, Debug, Clone)]
pub struct RadiusFader {
    max_radius: f32,
    duration: f32,
    radius: f32,
    opacity: Opacity,
    run: Option<FadeRun>,
    signals: Vec<FadeSignal>,
}

impl RadiusFader {
    pub fn new(max_radius: f32, duration: f32) -> Self {
        Self {
            max_radius: max_radius.max(0.0),
            duration: duration.max(0.0),
            radius: 0.0,
            opacity: Opacity::TRANSPARENT,
            run: None,
            signals: Vec::new(),
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.max_radius, tuning.radius_fade_duration)
    }

    pub fn set_limits(&mut self, max_radius: f32, duration: f32) {
        self.max_radius = max_radius.max(0.0);
        self.duration = duration.max(0.0);
        self.radius = self.radius.min(self.max_radius);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    #[cfg(test)]
    pub fn direction(&self) -> Option<FadeDirection> {
        self.run.map(|run| run.direction)
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Cancel any running fade and start a new one from the current values.
    pub fn fade(&mut self, direction: FadeDirection) {
        self.run = Some(FadeRun {
            direction,
            start_radius: self.radius,
            start_opacity: self.opacity.0,
            elapsed: 0.0,
        });
        self.signals.push(FadeSignal::Started(direction));
    }

    /// Step the running fade by one frame.
    pub fn advance(&mut self, dt: f32) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        run.elapsed += dt.max(0.0);
        let t = if self.duration > 0.0 {
            run.elapsed / self.duration
        } else {
            1.0
        };

        let (target_radius, target_opacity) = match run.direction {
            FadeDirection::In => (self.max_radius, Opacity::OPAQUE.0),
            FadeDirection::Out => (0.0, Opacity::TRANSPARENT.0),
        };

        // A dimension already at its target stays put.
        if self.radius != target_radius {
            self.radius = smoothstep(run.start_radius, target_radius, t);
        }
        if self.opacity.0 != target_opacity {
            self.opacity = Opacity::new(smoothstep(run.start_opacity, target_opacity, t));
        }

        if run.elapsed >= self.duration {
            let direction = run.direction;
            self.run = None;
            self.signals.push(FadeSignal::Completed(direction));
        }
    }

    /// Zero radius and opacity, dropping any running fade.
    pub fn reset(&mut self) {
        self.radius = 0.0;
        self.opacity = Opacity::TRANSPARENT;
        self.run = None;
    }

    pub fn drain_signals(&mut self) -> impl Iterator<Item = FadeSignal> + '_ {
        self.signals.drain(..)
    }
}

impl FromWorld for RadiusFader {
    fn from_world(world: &mut World) -> Self {
        let tuning = world.get_resource::<Tuning>().cloned().unwrap_or_default();
        Self::from_tuning(&tuning)
    }
}

/// Advance the radius fade once per frame and forward its notifications.
pub fn advance_radius_fade(
    time: Res<Time>,
    mut fader: ResMut<RadiusFader>,
    mut signals: MessageWriter<FadeSignal>,
) {
    fader.advance(time.delta_secs());
    for signal in fader.drain_signals() {
        debug!("[RadiusFade] {signal:?}");
        signals.write(signal);
    }
}
