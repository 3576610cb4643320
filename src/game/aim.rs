use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::f32::consts::TAU;

use super::anchor::AnchorController;
use super::components::MainCamera;
use super::fade::RadiusFader;
use super::types::{InputMode, Opacity};
use crate::config::tuning::{radius_vertex_count, Tuning};

/// Latest raw aim input: written in `SwingSet::Input`, consumed by the tracker and the controller.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct AimInput {
    pub mode: InputMode,
    /// Cursor projected into world space.
    pub cursor_world: Vec2,
    /// Raw left stick, not normalized.
    pub stick: Vec2,
}

impl AimInput {
    /// Fold one frame of device activity in. Returns the new mode if it switched.
    pub fn observe(
        &mut self,
        cursor_world: Option<Vec2>,
        mouse_moved: bool,
        stick: Vec2,
        deadzone: f32,
    ) -> Option<InputMode> {
        if let Some(cursor) = cursor_world {
            self.cursor_world = cursor;
        }
        self.stick = stick;

        let next = if stick.length() > deadzone {
            InputMode::Directional
        } else if mouse_moved {
            InputMode::Pointer
        } else {
            self.mode
        };

        if next == self.mode {
            return None;
        }
        self.mode = next;
        Some(next)
    }
}

/// Direction from `origin` toward the aim input, scaled to `max_radius`. Zero when degenerate.
pub fn aim_vector(input: &AimInput, origin: Vec2, max_radius: f32) -> Vec2 {
    let direction = match input.mode {
        InputMode::Pointer => input.cursor_world - origin,
        InputMode::Directional => input.stick,
    };
    direction.normalize_or_zero() * max_radius
}

/// Closed polyline around `center`, stepping `draw_scale` of a full turn per vertex.
pub fn radius_polygon(center: Vec2, radius: f32, draw_scale: f32) -> Vec<Vec2> {
    let count = radius_vertex_count(draw_scale);
    let step = TAU / (count - 1).max(1) as f32;
    let mut points: Vec<Vec2> = (1..=count)
        .map(|i| center + Vec2::from_angle(step * i as f32) * radius)
        .collect();
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first.distance_squared(last) > f32::EPSILON {
            points.push(first);
        }
    }
    points
}

/// Per-frame aim state exposed to the radius-circle and handle renderers.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct AimTracker {
    active_position: Vec2,
    aim_vector: Vec2,
    radius: f32,
    opacity: Opacity,
}

impl AimTracker {
    pub fn update(
        &mut self,
        controller: &AnchorController,
        input: &AimInput,
        fader: &RadiusFader,
        max_radius: f32,
    ) {
        self.active_position = controller.active_position();
        self.aim_vector = aim_vector(input, self.active_position, max_radius);
        self.radius = fader.radius();
        self.opacity = fader.opacity();
    }

    pub fn active_position(&self) -> Vec2 {
        self.active_position
    }

    pub fn handle_position(&self) -> Vec2 {
        self.active_position + self.aim_vector
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }
}

// ── Systems ─────────────────────────────────────────────────────────

/// Sample cursor + first gamepad and switch input mode on activity.
pub fn read_aim_input(
    tuning: Res<Tuning>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    gamepads: Query<&Gamepad>,
    mut input: ResMut<AimInput>,
) {
    let cursor_world = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .and_then(|cursor| {
            let (camera, camera_transform) = cameras.single().ok()?;
            camera.viewport_to_world_2d(camera_transform, cursor).ok()
        });

    let stick = gamepads
        .iter()
        .next()
        .map(|gamepad| gamepad.left_stick())
        .unwrap_or(Vec2::ZERO);

    let mouse_moved = mouse_motion.delta != Vec2::ZERO;
    if let Some(mode) = input.observe(cursor_world, mouse_moved, stick, tuning.stick_deadzone) {
        info!("Aim input switched to {}", mode.label());
    }
}

pub fn update_aim_tracker(
    tuning: Res<Tuning>,
    controller: Res<AnchorController>,
    input: Res<AimInput>,
    fader: Res<RadiusFader>,
    mut tracker: ResMut<AimTracker>,
) {
    tracker.update(&controller, &input, &fader, tuning.max_radius);
}
