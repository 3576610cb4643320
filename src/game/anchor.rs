use bevy::prelude::*;

use super::aim::{aim_vector, AimInput};
use super::events::{BeatTick, ReleaseAnchor, SwingEvent};
use super::fade::RadiusFader;
use super::types::{FadeDirection, InputMode, NewestMarker, Slot, SoundId};
use crate::config::tuning::Tuning;

/// A planted anchor. Never moves once placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    Empty,
    OneAnchor(Slot),
    TwoAnchors,
}

/// Owns both anchor slots and drives the spawn/retract cycle on each beat.
#[derive(Resource, Debug, Clone, Default)]
pub struct AnchorController {
    slots: [Option<Anchor>; 2],
    newest: NewestMarker,
    /// Lone anchor position; frozen while two anchors are bound, last known when empty.
    center: Vec2,
}

impl AnchorController {
    pub fn state(&self) -> AnchorState {
        match (self.anchor(Slot::A), self.anchor(Slot::B)) {
            (None, None) => AnchorState::Empty,
            (Some(_), None) => AnchorState::OneAnchor(Slot::A),
            (None, Some(_)) => AnchorState::OneAnchor(Slot::B),
            (Some(_), Some(_)) => AnchorState::TwoAnchors,
        }
    }

    pub fn anchor(&self, slot: Slot) -> Option<&Anchor> {
        self.slots[slot.index()].as_ref()
    }

    pub fn anchor_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn newest(&self) -> NewestMarker {
        self.newest
    }

    /// Point the aim vector and radius circle are anchored to.
    pub fn active_position(&self) -> Vec2 {
        match self.state() {
            AnchorState::OneAnchor(slot) => self
                .anchor(slot)
                .map(|anchor| anchor.position)
                .unwrap_or(self.center),
            AnchorState::Empty | AnchorState::TwoAnchors => self.center,
        }
    }

    /// One beat: spawn while a slot is free, otherwise retract the anchor aimed away from.
    pub fn on_beat_tick(
        &mut self,
        input: &AimInput,
        fader: &mut RadiusFader,
        max_radius: f32,
    ) -> Vec<SwingEvent> {
        let mut events = Vec::new();

        match self.state() {
            AnchorState::Empty => {
                let position = input.cursor_world;
                self.spawn(Slot::A, position, &mut events);
                fader.fade(FadeDirection::In);
            }
            AnchorState::OneAnchor(lone) => {
                let Some(origin) = self.anchor(lone).map(|anchor| anchor.position) else {
                    return events;
                };
                let position = origin + aim_vector(input, origin, max_radius);
                let slot = lone.other();
                self.spawn(slot, position, &mut events);
                self.center = origin;
                fader.fade(FadeDirection::Out);
                events.push(SwingEvent::FillSegment {
                    from: origin,
                    to: position,
                });
            }
            AnchorState::TwoAnchors => {
                let metric_a = self.retraction_metric(Slot::A, input);
                let metric_b = self.retraction_metric(Slot::B, input);
                // Ties release B.
                let released = if metric_a > metric_b { Slot::A } else { Slot::B };
                events = self.retract(released, fader);
            }
        }

        events
    }

    /// Remove the anchor in `slot`. No-op on an empty slot.
    pub fn retract(&mut self, slot: Slot, fader: &mut RadiusFader) -> Vec<SwingEvent> {
        let mut events = Vec::new();
        if self.slots[slot.index()].take().is_none() {
            return events;
        }
        debug!("[Anchor] {slot:?} retracted");
        events.push(SwingEvent::AnchorRetracted { slot });

        let survivor = slot.other();
        let mut reversed = false;
        if let Some(kept) = self.anchor(survivor).copied() {
            reversed = !self.newest.is(survivor);
            self.newest = survivor.into();
            self.center = kept.position;
            fader.fade(FadeDirection::In);
            events.push(SwingEvent::EmptySegment { reversed });
        } else {
            fader.reset();
            self.newest = NewestMarker::None;
            events.push(SwingEvent::EmptySegment { reversed });
            events.push(SwingEvent::BothAnchorsLost);
        }

        events
    }

    /// Drop all anchors without emitting anything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn spawn(&mut self, slot: Slot, position: Vec2, events: &mut Vec<SwingEvent>) {
        let entry = &mut self.slots[slot.index()];
        if entry.is_some() {
            return;
        }
        *entry = Some(Anchor { position });
        self.newest = slot.into();
        self.center = position;
        debug!("[Anchor] {slot:?} spawned at {position}");
        events.push(SwingEvent::PlaySound(SoundId::Kick));
        events.push(SwingEvent::AnchorSpawned { slot, position });
    }

    /// Larger = aimed further away = released on a two-anchor beat.
    fn retraction_metric(&self, slot: Slot, input: &AimInput) -> f32 {
        let (Some(own), Some(other)) = (self.anchor(slot), self.anchor(slot.other())) else {
            return 0.0;
        };
        match input.mode {
            // Absolute: distance from the cursor.
            InputMode::Pointer => input.cursor_world.distance(own.position),
            // Relative: distance from the other anchor pushed along the stick.
            InputMode::Directional => own.position.distance(other.position + input.stick),
        }
    }
}

// ── Systems ─────────────────────────────────────────────────────────

/// Beat subscription: one spawn-or-retract per `BeatTick`, in arrival order.
pub fn apply_beat_ticks(
    tuning: Res<Tuning>,
    input: Res<AimInput>,
    mut ticks: MessageReader<BeatTick>,
    mut controller: ResMut<AnchorController>,
    mut fader: ResMut<RadiusFader>,
    mut events: MessageWriter<SwingEvent>,
) {
    for tick in ticks.read() {
        let emitted = controller.on_beat_tick(&input, &mut fader, tuning.max_radius);
        debug!(
            "[Beat {}] {:?} ({} events)",
            tick.beat,
            controller.state(),
            emitted.len()
        );
        events.write_batch(emitted);
    }
}

/// Out-of-beat anchor removals requested by other gameplay.
pub fn apply_anchor_releases(
    mut releases: MessageReader<ReleaseAnchor>,
    mut controller: ResMut<AnchorController>,
    mut fader: ResMut<RadiusFader>,
    mut events: MessageWriter<SwingEvent>,
) {
    for release in releases.read() {
        events.write_batch(controller.retract(release.slot, &mut fader));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;

    const MAX_RADIUS: f32 = 10.0;

    fn pointer_at(x: f32, y: f32) -> AimInput {
        AimInput {
            mode: InputMode::Pointer,
            cursor_world: Vec2::new(x, y),
            stick: Vec2::ZERO,
        }
    }

    fn stick(x: f32, y: f32) -> AimInput {
        AimInput {
            mode: InputMode::Directional,
            cursor_world: Vec2::ZERO,
            stick: Vec2::new(x, y),
        }
    }

    fn fader() -> RadiusFader {
        RadiusFader::new(MAX_RADIUS, 1.0)
    }

    /// A at (5,5), B at (15,5), B newest.
    fn bound_pair(fader: &mut RadiusFader) -> AnchorController {
        let mut controller = AnchorController::default();
        controller.on_beat_tick(&pointer_at(5.0, 5.0), fader, MAX_RADIUS);
        controller.on_beat_tick(&pointer_at(30.0, 5.0), fader, MAX_RADIUS);
        controller
    }

    #[test]
    fn first_tick_spawns_a_at_cursor() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        let events = controller.on_beat_tick(&pointer_at(5.0, 5.0), &mut fader, MAX_RADIUS);

        assert_eq!(controller.state(), AnchorState::OneAnchor(Slot::A));
        assert_eq!(controller.anchor(Slot::A).map(|a| a.position), Some(Vec2::new(5.0, 5.0)));
        assert_eq!(controller.newest(), NewestMarker::A);
        assert_eq!(fader.direction(), Some(FadeDirection::In));
        assert_eq!(
            events,
            vec![
                SwingEvent::PlaySound(SoundId::Kick),
                SwingEvent::AnchorSpawned {
                    slot: Slot::A,
                    position: Vec2::new(5.0, 5.0)
                },
            ]
        );
    }

    #[test]
    fn first_tick_uses_cursor_even_in_directional_mode() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        let input = AimInput {
            mode: InputMode::Directional,
            cursor_world: Vec2::new(-1.0, 2.0),
            stick: Vec2::new(1.0, 0.0),
        };
        controller.on_beat_tick(&input, &mut fader, MAX_RADIUS);
        assert_eq!(controller.anchor(Slot::A).map(|a| a.position), Some(Vec2::new(-1.0, 2.0)));
    }

    #[test]
    fn second_tick_spawns_b_along_aim_and_fills_old_to_new() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        controller.on_beat_tick(&pointer_at(5.0, 5.0), &mut fader, MAX_RADIUS);
        let events = controller.on_beat_tick(&pointer_at(8.0, 5.0), &mut fader, MAX_RADIUS);

        let b = Vec2::new(5.0 + MAX_RADIUS, 5.0);
        assert_eq!(controller.state(), AnchorState::TwoAnchors);
        assert_eq!(controller.anchor(Slot::B).map(|a| a.position), Some(b));
        assert_eq!(controller.newest(), NewestMarker::B);
        assert_eq!(fader.direction(), Some(FadeDirection::Out));
        assert_eq!(
            events.last(),
            Some(&SwingEvent::FillSegment {
                from: Vec2::new(5.0, 5.0),
                to: b
            })
        );
    }

    #[test]
    fn second_tick_with_degenerate_aim_stacks_on_first_anchor() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        controller.on_beat_tick(&pointer_at(5.0, 5.0), &mut fader, MAX_RADIUS);
        controller.on_beat_tick(&pointer_at(5.0, 5.0), &mut fader, MAX_RADIUS);
        assert_eq!(controller.anchor(Slot::B).map(|a| a.position), Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn pointer_retracts_anchor_farther_from_cursor() {
        let mut fader = fader();
        let mut controller = bound_pair(&mut fader);

        // Cursor near B: A is farther and goes; B was already newest.
        let events = controller.on_beat_tick(&pointer_at(14.0, 5.0), &mut fader, MAX_RADIUS);
        assert_eq!(controller.state(), AnchorState::OneAnchor(Slot::B));
        assert_eq!(controller.newest(), NewestMarker::B);
        assert_eq!(fader.direction(), Some(FadeDirection::In));
        assert_eq!(
            events,
            vec![
                SwingEvent::AnchorRetracted { slot: Slot::A },
                SwingEvent::EmptySegment { reversed: false },
            ]
        );
    }

    #[test]
    fn keeping_the_older_anchor_reverses_the_segment() {
        let mut fader = fader();
        let mut controller = bound_pair(&mut fader);

        let events = controller.on_beat_tick(&pointer_at(4.0, 5.0), &mut fader, MAX_RADIUS);
        assert_eq!(controller.state(), AnchorState::OneAnchor(Slot::A));
        assert_eq!(controller.newest(), NewestMarker::A);
        assert_eq!(events.last(), Some(&SwingEvent::EmptySegment { reversed: true }));
    }

    #[test]
    fn equal_metrics_release_b() {
        for _ in 0..3 {
            let mut fader = fader();
            let mut controller = bound_pair(&mut fader);
            // Cursor on the perpendicular bisector.
            let events = controller.on_beat_tick(&pointer_at(10.0, -7.0), &mut fader, MAX_RADIUS);
            assert_eq!(events.first(), Some(&SwingEvent::AnchorRetracted { slot: Slot::B }));
            assert_eq!(controller.state(), AnchorState::OneAnchor(Slot::A));
        }
    }

    #[test]
    fn directional_metric_swings_relative_to_the_other_anchor() {
        let mut fader = fader();
        let mut controller = bound_pair(&mut fader);

        // Stick pointing from A toward B: |A - (B + s)| = 10 + 3, |B - (A + s)| = 10 - 3.
        let events = controller.on_beat_tick(&stick(3.0, 0.0), &mut fader, MAX_RADIUS);
        assert_eq!(events.first(), Some(&SwingEvent::AnchorRetracted { slot: Slot::A }));

        let mut fader = RadiusFader::new(MAX_RADIUS, 1.0);
        let mut controller = bound_pair(&mut fader);
        let events = controller.on_beat_tick(&stick(-3.0, 0.0), &mut fader, MAX_RADIUS);
        assert_eq!(events.first(), Some(&SwingEvent::AnchorRetracted { slot: Slot::B }));
    }

    #[test]
    fn directional_spawn_uses_normalized_stick() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        controller.on_beat_tick(&pointer_at(0.0, 0.0), &mut fader, MAX_RADIUS);
        controller.on_beat_tick(&stick(0.0, 0.25), &mut fader, MAX_RADIUS);
        let b = controller.anchor(Slot::B).map(|a| a.position).unwrap_or_default();
        assert!((b - Vec2::new(0.0, MAX_RADIUS)).length() < 1e-5);
    }

    #[test]
    fn tick_sequence_alternates_counts_and_keeps_marker_consistent() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        let cursors = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 1.0),
            Vec2::new(-4.0, 2.0),
            Vec2::new(9.0, -9.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-2.0, 5.0),
            Vec2::new(7.0, 0.0),
        ];
        let mut fills = 0;
        let mut previous = controller.anchor_count();
        for cursor in cursors {
            let events = controller.on_beat_tick(&pointer_at(cursor.x, cursor.y), &mut fader, MAX_RADIUS);
            let count = controller.anchor_count();
            if previous < 2 {
                assert_eq!(count, previous + 1);
            } else {
                assert_eq!(count, 1);
            }
            assert_eq!(controller.newest() == NewestMarker::None, count == 0);
            if let Some(slot) = controller.newest().slot() {
                assert!(controller.anchor(slot).is_some());
            }
            fills += events
                .iter()
                .filter(|e| matches!(e, SwingEvent::FillSegment { .. }))
                .count();
            previous = count;
        }
        // Pairs formed on ticks 2, 4, 6.
        assert_eq!(fills, 3);
    }

    #[test]
    fn fill_after_retraction_runs_from_survivor_to_new_anchor() {
        let mut fader = fader();
        let mut controller = bound_pair(&mut fader);
        controller.on_beat_tick(&pointer_at(4.0, 5.0), &mut fader, MAX_RADIUS);
        let events = controller.on_beat_tick(&pointer_at(5.0, 50.0), &mut fader, MAX_RADIUS);
        assert_eq!(controller.newest(), NewestMarker::B);
        assert_eq!(
            events.last(),
            Some(&SwingEvent::FillSegment {
                from: Vec2::new(5.0, 5.0),
                to: Vec2::new(5.0, 15.0)
            })
        );
    }

    #[test]
    fn retracting_last_anchor_is_terminal_exactly_once() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        controller.on_beat_tick(&pointer_at(5.0, 5.0), &mut fader, MAX_RADIUS);
        fader.advance(0.5);
        assert!(fader.radius() > 0.0);

        let events = controller.retract(Slot::A, &mut fader);
        assert_eq!(controller.state(), AnchorState::Empty);
        assert_eq!(controller.newest(), NewestMarker::None);
        assert_eq!(fader.radius(), 0.0);
        assert_eq!(fader.opacity().0, 0.0);
        assert!(!fader.is_running());
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == SwingEvent::BothAnchorsLost)
                .count(),
            1
        );

        assert!(controller.retract(Slot::A, &mut fader).is_empty());
        assert!(controller.retract(Slot::B, &mut fader).is_empty());
    }

    #[test]
    fn external_release_of_newest_hands_marker_to_survivor() {
        let mut fader = fader();
        let mut controller = bound_pair(&mut fader);
        let events = controller.retract(Slot::B, &mut fader);
        assert_eq!(controller.newest(), NewestMarker::A);
        assert_eq!(controller.active_position(), Vec2::new(5.0, 5.0));
        assert_eq!(events.last(), Some(&SwingEvent::EmptySegment { reversed: true }));
    }

    #[test]
    fn empty_controller_keeps_last_center() {
        let mut controller = AnchorController::default();
        let mut fader = fader();
        controller.on_beat_tick(&pointer_at(2.0, 3.0), &mut fader, MAX_RADIUS);
        controller.retract(Slot::A, &mut fader);
        assert_eq!(controller.active_position(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn beat_message_drives_controller_inside_app() {
        let mut app = App::new();
        app.add_message::<BeatTick>()
            .add_message::<SwingEvent>()
            .insert_resource(Tuning::default())
            .insert_resource(RadiusFader::new(MAX_RADIUS, 1.0))
            .insert_resource(pointer_at(5.0, 5.0))
            .init_resource::<AnchorController>()
            .add_systems(Update, apply_beat_ticks);

        app.world_mut().write_message(BeatTick { beat: 1 });
        app.update();

        let controller = app.world().resource::<AnchorController>();
        assert_eq!(controller.state(), AnchorState::OneAnchor(Slot::A));

        let messages = app.world().resource::<Messages<SwingEvent>>();
        let mut cursor = messages.get_cursor();
        let written: Vec<SwingEvent> = cursor.read(messages).cloned().collect();
        assert!(written.contains(&SwingEvent::AnchorSpawned {
            slot: Slot::A,
            position: Vec2::new(5.0, 5.0)
        }));
    }
}
