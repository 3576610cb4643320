use bevy::camera::ScalingMode;
use bevy::prelude::*;

use crate::config::tuning::{self, Tuning};
use crate::game::{
    aim::{self, AimInput, AimTracker},
    anchor::{self, AnchorController},
    components::*,
    events::{BeatTick, FadeSignal, ReleaseAnchor, SwingEvent},
    fade::{self, RadiusFader},
    rhythm::{self, BeatClock},
};

// ── SystemSets (strict Update ordering, Playing-phase only) ─────────

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SwingSet {
    Input,
    Beat,
    Anchors,
    Fade,
    Track,
    Present,
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BeatTick>();
        app.add_message::<SwingEvent>();
        app.add_message::<ReleaseAnchor>();
        app.add_message::<FadeSignal>();
        app.init_state::<GamePhase>();

        app.init_resource::<AimInput>();
        app.init_resource::<AimTracker>();
        app.init_resource::<AnchorController>();
        app.init_resource::<RadiusFader>();
        app.init_resource::<BeatClock>();

        // One cooperative frame: input → beats → anchors → fade → tracker → visuals
        app.configure_sets(
            Update,
            (
                SwingSet::Input.run_if(in_state(GamePhase::Playing)),
                SwingSet::Beat.run_if(in_state(GamePhase::Playing)),
                SwingSet::Anchors.run_if(in_state(GamePhase::Playing)),
                SwingSet::Fade.run_if(in_state(GamePhase::Playing)),
                SwingSet::Track.run_if(in_state(GamePhase::Playing)),
                SwingSet::Present.run_if(in_state(GamePhase::Playing)),
            )
                .chain(),
        );

        app.add_systems(Update, aim::read_aim_input.in_set(SwingSet::Input));
        app.add_systems(
            Update,
            (rhythm::toggle_beat_pause, rhythm::tick_beat_clock)
                .chain()
                .in_set(SwingSet::Beat),
        );
        app.add_systems(
            Update,
            (
                anchor::apply_beat_ticks,
                anchor::apply_anchor_releases,
                enter_death_on_loss,
            )
                .chain()
                .in_set(SwingSet::Anchors),
        );
        app.add_systems(Update, fade::advance_radius_fade.in_set(SwingSet::Fade));
        app.add_systems(Update, aim::update_aim_tracker.in_set(SwingSet::Track));

        // ── Startup ─────────────────────────────────────────────────────
        app.add_systems(Startup, setup_camera);

        // ── OnEnter(Playing): fresh rig (also the initial subscription) ─
        app.add_systems(OnEnter(GamePhase::Playing), reset_swing_rig);

        // ── Death → Playing ─────────────────────────────────────────────
        app.add_systems(Update, restart_input.run_if(in_state(GamePhase::Death)));

        // ── Always-on ───────────────────────────────────────────────────
        app.add_systems(Update, (tuning::tuning_reload_input, apply_tuning_changes).chain());
    }
}

// ── Startup ─────────────────────────────────────────────────────────

fn setup_camera(mut commands: Commands, tuning: Res<Tuning>) {
    let ppu = tuning.pixels_per_unit.max(1.0);

    commands.spawn((
        Camera2d,
        MainCamera,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::WindowSize,
            // 1 world unit = ppu pixels
            scale: 1.0 / ppu,
            ..OrthographicProjection::default_2d()
        }),
    ));
}

// ── Phase transitions ───────────────────────────────────────────────

fn reset_swing_rig(
    mut controller: ResMut<AnchorController>,
    mut fader: ResMut<RadiusFader>,
    mut tracker: ResMut<AimTracker>,
    mut clock: ResMut<BeatClock>,
) {
    controller.reset();
    fader.reset();
    *tracker = AimTracker::default();
    clock.reset();
    info!("Swing rig ready");
}

/// Both anchors gone: the run is over.
fn enter_death_on_loss(
    mut events: MessageReader<SwingEvent>,
    clock: Res<BeatClock>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    let lost = events
        .read()
        .filter(|event| matches!(event, SwingEvent::BothAnchorsLost))
        .count();
    if lost > 0 {
        info!("Both anchors lost after {} beats", clock.beats().0);
        next_state.set(GamePhase::Death);
    }
}

/// Restart with Enter/R or the gamepad South button.
fn restart_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    let pressed = keyboard.just_pressed(KeyCode::Enter)
        || keyboard.just_pressed(KeyCode::KeyR)
        || gamepads
            .iter()
            .any(|gamepad| gamepad.just_pressed(GamepadButton::South));
    if pressed {
        info!("Restarting");
        next_state.set(GamePhase::Playing);
    }
}

/// Push reloaded tuning into the long-lived core state.
fn apply_tuning_changes(
    tuning: Res<Tuning>,
    mut fader: ResMut<RadiusFader>,
    mut clock: ResMut<BeatClock>,
) {
    if tuning.is_changed() {
        fader.set_limits(tuning.max_radius, tuning.radius_fade_duration);
        clock.set_interval(tuning.beat_interval());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::anchor::AnchorState;
    use crate::game::types::{FadeDirection, InputMode, Slot};
    use bevy::ecs::message::Messages;
    use bevy::state::app::StatesPlugin;

    const MAX_RADIUS: f32 = 10.0;

    fn pointer_at(x: f32, y: f32) -> AimInput {
        AimInput {
            mode: InputMode::Pointer,
            cursor_world: Vec2::new(x, y),
            stick: Vec2::ZERO,
        }
    }

    fn one_anchor_rig() -> (AnchorController, RadiusFader) {
        let mut controller = AnchorController::default();
        let mut fader = RadiusFader::new(MAX_RADIUS, 1.0);
        controller.on_beat_tick(&pointer_at(1.0, 2.0), &mut fader, MAX_RADIUS);
        fader.advance(2.0);
        (controller, fader)
    }

    #[test]
    fn releasing_last_anchor_ends_the_run() {
        let (controller, fader) = one_anchor_rig();
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<GamePhase>()
            .add_message::<ReleaseAnchor>()
            .add_message::<SwingEvent>()
            .insert_resource(controller)
            .insert_resource(fader)
            .insert_resource(BeatClock::new(0.6))
            .add_systems(
                Update,
                (anchor::apply_anchor_releases, enter_death_on_loss).chain(),
            );

        app.world_mut().write_message(ReleaseAnchor { slot: Slot::A });
        app.update();

        let messages = app.world().resource::<Messages<SwingEvent>>();
        let mut cursor = messages.get_cursor();
        let lost = cursor
            .read(messages)
            .filter(|event| matches!(event, SwingEvent::BothAnchorsLost))
            .count();
        assert_eq!(lost, 1);
        assert_eq!(
            app.world().resource::<AnchorController>().state(),
            AnchorState::Empty
        );

        // The queued transition applies on the next frame.
        app.update();
        assert_eq!(
            app.world().resource::<State<GamePhase>>().get(),
            &GamePhase::Death
        );
    }

    #[test]
    fn releasing_one_of_two_anchors_keeps_playing() {
        let (mut controller, mut fader) = one_anchor_rig();
        controller.on_beat_tick(&pointer_at(4.0, 2.0), &mut fader, MAX_RADIUS);
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<GamePhase>()
            .add_message::<ReleaseAnchor>()
            .add_message::<SwingEvent>()
            .insert_resource(controller)
            .insert_resource(fader)
            .insert_resource(BeatClock::new(0.6))
            .add_systems(
                Update,
                (anchor::apply_anchor_releases, enter_death_on_loss).chain(),
            );

        app.world_mut().write_message(ReleaseAnchor { slot: Slot::A });
        app.update();
        app.update();

        assert_eq!(
            app.world().resource::<AnchorController>().state(),
            AnchorState::OneAnchor(Slot::B)
        );
        assert_eq!(
            app.world().resource::<State<GamePhase>>().get(),
            &GamePhase::Playing
        );
    }

    #[test]
    fn reset_swing_rig_returns_to_empty_and_collapsed() {
        let (controller, mut fader) = one_anchor_rig();
        assert_eq!(fader.radius(), MAX_RADIUS);
        fader.fade(FadeDirection::Out);
        fader.advance(0.25);

        let mut clock = BeatClock::new(0.6);
        clock.advance(2.0);
        assert!(clock.beats().0 > 0);

        let mut app = App::new();
        app.insert_resource(controller)
            .insert_resource(fader)
            .insert_resource(clock)
            .init_resource::<AimTracker>()
            .add_systems(Update, reset_swing_rig);
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<AnchorController>().state(), AnchorState::Empty);
        let fader = world.resource::<RadiusFader>();
        assert_eq!(fader.radius(), 0.0);
        assert_eq!(fader.opacity().0, 0.0);
        assert!(!fader.is_running());
        assert_eq!(world.resource::<BeatClock>().beats().0, 0);
    }
}
