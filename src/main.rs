mod config;
mod game;
mod plugins;

use bevy::prelude::*;

use config::tuning::Tuning;
use plugins::{
    game_plugin::GamePlugin,
    present_plugin::{PresentPlugin, BACKGROUND},
    ui_plugin::UiPlugin,
};

fn main() {
    let tuning = Tuning::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Beat Swing".into(),
                resolution: (1280u32, 720u32).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(BACKGROUND))
        .insert_resource(tuning)
        .add_plugins(GamePlugin)
        .add_plugins(PresentPlugin)
        .add_plugins(UiPlugin)
        .run();
}
