use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    aim::{radius_polygon, AimTracker},
    components::*,
    events::SwingEvent,
    segment::{self, SegmentVisual},
    types::{Slot, SoundId},
};
use crate::plugins::game_plugin::SwingSet;

/// Anchor / handle / segment yellow (F7C95D).
pub const SWING_YELLOW: Color = Color::srgb(0.969, 0.788, 0.365);
/// Background dark blue (09131B).
pub const BACKGROUND: Color = Color::srgb(0.035, 0.075, 0.106);

/// Visual and audio adapters for the swing core: everything here only consumes
/// `SwingEvent`s and the `AimTracker`.
pub struct PresentPlugin;

impl Plugin for PresentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnchorHandles>();
        app.init_resource::<SegmentVisual>();

        // Event consumers — independent readers, chained for deterministic order
        app.add_systems(
            Update,
            (spawn_anchor_visuals, segment::drive_segment, play_swing_sounds)
                .chain()
                .in_set(SwingSet::Present),
        );

        // Immediate-mode drawing
        app.add_systems(
            Update,
            (draw_radius_circle, draw_aim_handle, draw_segment, draw_anchors)
                .after(SwingSet::Present)
                .run_if(in_state(GamePhase::Playing)),
        );

        app.add_systems(OnEnter(GamePhase::Playing), clear_visuals);
        app.add_systems(Update, apply_segment_tuning);
    }
}

// ── Event consumers ─────────────────────────────────────────────────

/// Spawn a visual per planted anchor and despawn it when the anchor is retracted.
fn spawn_anchor_visuals(
    mut commands: Commands,
    mut events: MessageReader<SwingEvent>,
    mut handles: ResMut<AnchorHandles>,
) {
    for event in events.read() {
        match event {
            SwingEvent::AnchorSpawned { slot, position } => {
                let entity = commands
                    .spawn((
                        InGame,
                        AnchorVisual { slot: *slot },
                        Name::new(anchor_name(*slot)),
                        Transform::from_translation(position.extend(0.0)),
                    ))
                    .id();
                if let Some(stale) = handles.insert(*slot, entity) {
                    warn!("Anchor {slot:?} visual replaced without retraction");
                    commands.entity(stale).try_despawn();
                }
            }
            SwingEvent::AnchorRetracted { slot } => {
                if let Some(entity) = handles.take(*slot) {
                    commands.entity(entity).try_despawn();
                }
            }
            _ => {}
        }
    }
}

fn anchor_name(slot: Slot) -> &'static str {
    match slot {
        Slot::A => "anchor_a",
        Slot::B => "anchor_b",
    }
}

fn play_swing_sounds(
    mut commands: Commands,
    tuning: Res<Tuning>,
    asset_server: Res<AssetServer>,
    mut events: MessageReader<SwingEvent>,
) {
    for event in events.read() {
        if let SwingEvent::PlaySound(sound) = event {
            let path = match sound {
                SoundId::Kick => tuning.kick_sound.clone(),
            };
            let handle: Handle<AudioSource> = asset_server.load(path);
            commands.spawn((
                AudioPlayer::new(handle),
                PlaybackSettings::DESPAWN,
            ));
        }
    }
}

/// Restart: drop every session entity and hide the segment.
fn clear_visuals(
    mut commands: Commands,
    mut handles: ResMut<AnchorHandles>,
    mut segment: ResMut<SegmentVisual>,
    query: Query<Entity, With<InGame>>,
) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
    handles.clear();
    segment.clear();
}

fn apply_segment_tuning(tuning: Res<Tuning>, mut segment: ResMut<SegmentVisual>) {
    if tuning.is_changed() {
        segment.set_duration(tuning.segment_fill_duration);
    }
}

// ── Drawing ─────────────────────────────────────────────────────────

/// Radius circle around the active position, faded with the radius opacity.
fn draw_radius_circle(mut gizmos: Gizmos, tuning: Res<Tuning>, tracker: Res<AimTracker>) {
    let opacity = tracker.opacity();
    if !opacity.is_visible() || tracker.radius() <= 0.0 {
        return;
    }
    let points = radius_polygon(
        tracker.active_position(),
        tracker.radius(),
        tuning.radius_draw_scale,
    );
    gizmos.linestrip_2d(points, SWING_YELLOW.with_alpha(opacity.0));
}

/// Aim handle at the tip of the aim vector, same opacity as the circle.
fn draw_aim_handle(mut gizmos: Gizmos, tuning: Res<Tuning>, tracker: Res<AimTracker>) {
    let opacity = tracker.opacity();
    if !opacity.is_visible() {
        return;
    }
    gizmos.circle_2d(
        Isometry2d::from_translation(tracker.handle_position()),
        tuning.handle_draw_radius,
        SWING_YELLOW.with_alpha(opacity.0),
    );
}

fn draw_segment(mut gizmos: Gizmos, segment: Res<SegmentVisual>) {
    if let Some((start, end)) = segment.visible_span() {
        gizmos.line_2d(start, end, SWING_YELLOW);
    }
}

fn draw_anchors(
    mut gizmos: Gizmos,
    tuning: Res<Tuning>,
    query: Query<&Transform, With<AnchorVisual>>,
) {
    for transform in &query {
        gizmos.circle_2d(
            Isometry2d::from_translation(transform.translation.truncate()),
            tuning.anchor_draw_radius,
            SWING_YELLOW,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_visuals_despawns_every_session_entity() {
        let mut app = App::new();
        app.init_resource::<AnchorHandles>()
            .insert_resource(SegmentVisual::new(0.15))
            .add_systems(Update, clear_visuals);

        let anchor = app
            .world_mut()
            .spawn((InGame, AnchorVisual { slot: Slot::A }))
            .id();
        let other = app.world_mut().spawn(InGame).id();
        let kept = app.world_mut().spawn(Name::new("Outside session")).id();
        app.world_mut()
            .resource_mut::<AnchorHandles>()
            .insert(Slot::A, anchor);

        app.update();

        assert!(app.world().get_entity(anchor).is_err());
        assert!(app.world().get_entity(other).is_err());
        assert!(app.world().get_entity(kept).is_ok());
        assert_eq!(
            app.world_mut().resource_mut::<AnchorHandles>().take(Slot::A),
            None
        );
    }
}
