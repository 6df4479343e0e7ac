use bevy::prelude::*;
use bevy_debug_text_overlay::OverlayPlugin;

mod audio;
mod category;
mod config;
mod deck;
mod game_flow;
mod input;
mod rotation;
mod scoring;
mod state;
mod turn;
mod ui;

use config::GameConfig;
use input::GuessInput;
use state::GameState;

fn main() {
    let mut app = App::new();
    app.insert_resource(Msaa { samples: 4 })
        .insert_resource(WindowDescriptor {
            title: "Tilt Charades".to_owned(),
            #[cfg(target_os = "linux")]
            vsync: false, // workaround for https://github.com/bevyengine/bevy/issues/1908 (seems to be Mesa bug with X11 + Vulkan)
            ..Default::default()
        })
        .insert_resource(ClearColor(ui::BACKGROUND))
        .add_plugins(DefaultPlugins);

    // After DefaultPlugins, so that config warnings reach the log.
    let config = GameConfig::load_or_default();
    app.insert_resource(GuessInput::from_config(&config))
        .insert_resource(config)
        .add_state(GameState::Loading)
        .add_plugin(OverlayPlugin { font_size: 24.0, ..Default::default() })
        .add_plugin(audio::Plugin)
        .add_plugin(category::Plugin)
        .add_plugin(input::Plugin(GameState::Playing))
        .add_plugin(game_flow::Plugin(GameState::Playing))
        .add_plugin(ui::Plugin);

    #[cfg(feature = "debug")]
    app.add_plugin(bevy_inspector_egui::WorldInspectorPlugin::new());

    app.run();
}
