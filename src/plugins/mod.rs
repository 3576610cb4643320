pub mod game_plugin;
pub mod present_plugin;
pub mod ui_plugin;
