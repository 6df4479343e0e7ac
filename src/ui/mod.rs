//! Screens: loading, game setup, the game itself and the final ranking.
mod common;
mod game_screen;
mod loading;
mod results;
mod setup_menu;

pub use common::BACKGROUND;

use bevy::prelude::{Plugin as BevyPlugin, *};

use crate::state::GameState;

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(common::Plugin)
            .add_plugin(loading::Plugin)
            .add_plugin(setup_menu::Plugin(GameState::Setup))
            .add_plugin(game_screen::Plugin(GameState::Playing))
            .add_plugin(results::Plugin);
    }
}
