use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_ui_build_macros::{build_ui, rect, size, style, unit};
use bevy_ui_navigation::{Focusable, NavEvent, NavRequest};

use super::common::*;
use crate::{game_flow::FinalRanking, rotation::Player, state::GameState};

#[derive(Component, Clone)]
enum Button {
    NewGame,
    ExitApp,
}

fn ranking_line(rank: usize, player: &Player) -> String {
    format!("#{} Player {}  {} pts", rank + 1, player.id, player.score)
}

fn init(mut cmds: Commands, ui_assets: Res<UiAssets>, ranking: Res<FinalRanking>) {
    let node = NodeBundle {
        color: Color::NONE.into(),
        style: style! {
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
        },
        ..Default::default()
    };

    let leaderboard = cmds
        .spawn_bundle(node.clone())
        .insert(Name::new("Leaderboard"))
        .with_children(|parent| {
            for (rank, player) in ranking.0.iter().enumerate() {
                let color = hex_color(&player.color);
                let line = ui_assets.colored_text(&ranking_line(rank, player), 50.0, color);
                parent.spawn_bundle(TextBundle { style: style! { margin: rect!(5 px), }, ..line });
            }
        })
        .id();

    build_ui! {
        #[cmd(cmds)]
        node{ min_size: size!(100 pct, 100 pct) }[;Name::new("Results screen"), ScreenRoot](
            node{ position_type: PositionType::Absolute }[;
                UiColor(Color::rgba(1.0, 1.0, 1.0, 0.1)),
                MenuCursor::default(),
                Name::new("Cursor")
            ],
            node[ui_assets.large_text("Final ranking"); style! { margin: rect!(20 px), }],
            id(leaderboard),
            node[; Name::new("Menu column")](
                node[ui_assets.large_text("New game"); Focusable::default(), Button::NewGame],
                node[ui_assets.large_text("Exit to desktop"); Focusable::default(), Button::ExitApp]
            )
        )
    };
}

fn update(
    mut nav_events: EventReader<NavEvent>,
    mut state: ResMut<State<GameState>>,
    mut app_exit: EventWriter<AppExit>,
    buttons: Query<&Button>,
) {
    for event in nav_events.iter() {
        if let NavEvent::NoChanges { from, request: NavRequest::Action } = event {
            match buttons.get(*from.first()) {
                Ok(Button::NewGame) => state.set(GameState::Setup).unwrap(),
                Ok(Button::ExitApp) => app_exit.send(AppExit),
                _ => (),
            }
        }
    }
}

pub struct Plugin;
impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_system_set(SystemSet::on_enter(GameState::Results).with_system(init));
        app.add_system_set(SystemSet::on_exit(GameState::Results).with_system(despawn_screen));
        app.add_system_set(SystemSet::on_update(GameState::Results).with_system(update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_lines() {
        let player = Player { id: 3, score: 800, color: "4CAF50".to_owned() };
        assert_eq!(ranking_line(0, &player), "#1 Player 3  800 pts");
    }
}
