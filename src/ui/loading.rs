use bevy::prelude::*;

use super::common::*;
use crate::state::GameState;

fn init(mut cmds: Commands, ui_assets: Res<UiAssets>) {
    cmds.spawn_bundle(NodeBundle {
        color: Color::NONE.into(),
        style: Style {
            size: Size::new(Val::Percent(100.0), Val::Percent(100.0)),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..Default::default()
        },
        ..Default::default()
    })
    .insert_bundle((ScreenRoot, Name::new("Loading screen")))
    .with_children(|parent| {
        parent.spawn_bundle(ui_assets.large_text("Loading categories..."));
    });
}

pub struct Plugin;
impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_system_set(SystemSet::on_enter(GameState::Loading).with_system(init));
        app.add_system_set(SystemSet::on_exit(GameState::Loading).with_system(despawn_screen));
    }
}
