use bevy::prelude::*;

use crate::game::{
    anchor::AnchorController,
    aim::AimInput,
    components::*,
    rhythm::BeatClock,
};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud);
        app.add_systems(Update, update_hud);
        app.add_systems(OnEnter(GamePhase::Death), spawn_death_overlay);
        app.add_systems(OnExit(GamePhase::Death), despawn::<DeathOverlay>);
    }
}

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct DeathOverlay;

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new("Anchors: 0"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.8, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
    ));
}

fn update_hud(
    controller: Res<AnchorController>,
    input: Res<AimInput>,
    clock: Res<BeatClock>,
    mut text_query: Query<&mut Text, With<HudText>>,
) {
    let paused = if clock.paused { "  [paused]" } else { "" };
    for mut text in &mut text_query {
        **text = format!(
            "Anchors: {}  Aim: {}  Beat: {}{}",
            controller.anchor_count(),
            input.mode.label(),
            clock.beats().0,
            paused,
        );
    }
}

fn spawn_death_overlay(mut commands: Commands, clock: Res<BeatClock>) {
    commands
        .spawn((
            DeathOverlay,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            GlobalZIndex(10),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(format!("Lost your grip after {} beats", clock.beats().0)),
                TextFont { font_size: 48.0, ..default() },
                TextColor(Color::srgb(0.969, 0.788, 0.365)),
            ));
            parent.spawn((
                Text::new("Press ENTER / R (or A on a gamepad) to swing again"),
                TextFont { font_size: 22.0, ..default() },
                TextColor(Color::srgb(0.7, 0.7, 0.7)),
            ));
        });
}

fn despawn<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}
