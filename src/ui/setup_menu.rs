//! Pick categories and the number of players, then start a game.
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::{build_ui, rect, size, style, unit};
use bevy_ui_navigation::{Focusable, NavEvent, NavRequest};

use super::common::*;
use crate::{
    category::{CategoryStore, LoadReport},
    config::GameConfig,
    game_flow::{ActiveGame, GameSetup},
    state::GameState,
};

#[derive(Component, Clone, PartialEq)]
enum SetupElem {
    Category(String),
    SelectAll,
    SelectNone,
    FewerPlayers,
    MorePlayers,
    Start,
}

/// Text that reflects the current [`GameSetup`].
#[derive(Component, Clone)]
enum SetupLabel {
    Category { id: String, name: String },
    Players,
    Error,
}
impl SetupLabel {
    fn content(&self, setup: &GameSetup) -> String {
        match self {
            SetupLabel::Category { id, name } => {
                let mark = if setup.is_selected(id) { "x" } else { " " };
                format!("[{mark}] {name}")
            }
            SetupLabel::Players => format!("{} players", setup.players.get()),
            SetupLabel::Error => setup.error.as_ref().map_or_else(String::new, ToString::to_string),
        }
    }
}

fn update_menu(
    mut events: EventReader<NavEvent>,
    mut setup: ResMut<GameSetup>,
    mut game: ResMut<ActiveGame>,
    mut state: ResMut<State<GameState>>,
    store: Res<CategoryStore>,
    config: Res<GameConfig>,
    elems: Query<&SetupElem>,
) {
    for nav_event in events.iter() {
        if let NavEvent::NoChanges { from, request: NavRequest::Action } = nav_event {
            match elems.get(*from.first()) {
                Ok(SetupElem::Category(id)) => setup.toggle(id),
                Ok(SetupElem::SelectAll) => setup.select_all(&store),
                Ok(SetupElem::SelectNone) => setup.select_none(),
                Ok(SetupElem::FewerPlayers) => {
                    setup.players.adjust(-1);
                }
                Ok(SetupElem::MorePlayers) => {
                    setup.players.adjust(1);
                }
                Ok(SetupElem::Start) => {
                    match game.start(&setup, &store, &config, fastrand::Rng::new()) {
                        Ok(()) => {
                            setup.error = None;
                            state.set(GameState::Playing).unwrap();
                            return;
                        }
                        Err(err) => {
                            warn!("cannot start the game: {err}");
                            setup.error = Some(err);
                        }
                    }
                }
                Err(_) => {}
            }
        }
    }
}

fn refresh_labels(setup: Res<GameSetup>, mut labels: Query<(&mut Text, &SetupLabel)>) {
    if !setup.is_changed() {
        return;
    }
    for (mut text, label) in labels.iter_mut() {
        text.sections[0].value = label.content(&setup);
    }
}

fn init(
    mut cmds: Commands,
    ui_assets: Res<UiAssets>,
    setup: Res<GameSetup>,
    store: Res<CategoryStore>,
    report: Option<Res<LoadReport>>,
) {
    use FlexDirection as FD;
    use SetupElem::*;

    let focusable = Focusable::default();
    let text = |content: &str| ui_assets.text_bundle(content, 40.0);
    let label = |label: SetupLabel, font_size: f32, color: Color| {
        let content = label.content(&setup);
        (ui_assets.colored_text(&content, font_size, color), label)
    };
    let node = NodeBundle {
        color: Color::NONE.into(),
        style: style! {
            display: Display::Flex,
            flex_direction: FD::ColumnReverse,
            align_items: AlignItems::Center,
        },
        ..Default::default()
    };

    let category_list = cmds
        .spawn_bundle(NodeBundle {
            color: Color::NONE.into(),
            style: style! {
                flex_direction: FD::Row,
                flex_wrap: FlexWrap::Wrap,
                justify_content: JustifyContent::Center,
                max_size: size!(90 pct, auto),
            },
            ..Default::default()
        })
        .insert(Name::new("Category list"))
        .with_children(|parent| {
            if store.is_empty() {
                let missing = report.as_ref().map_or(0, |r| r.failed.len());
                let message = format!("No category could be loaded ({missing} missing)");
                parent.spawn_bundle(ui_assets.colored_text(&message, 36.0, Color::ORANGE_RED));
            }
            for category in store.listed() {
                let id = category.id.clone();
                let name = category.display_name.clone();
                let category_label = SetupLabel::Category { id: id.clone(), name };
                let (bundle, label) = label(category_label, 34.0, TEXT_COLOR);
                parent
                    .spawn_bundle(TextBundle { style: style! { margin: rect!(8 px), }, ..bundle })
                    .insert_bundle((label, Category(id), Focusable::default()));
            }
        })
        .id();
    let (players_text, players_label) = label(SetupLabel::Players, 40.0, TEXT_COLOR);
    let (error_text, error_label) = label(SetupLabel::Error, 32.0, Color::ORANGE_RED);

    build_ui! {
        #[cmd(cmds)]
        node{ min_size: size!(100 pct, 100 pct), justify_content: JustifyContent::Center }[;
            Name::new("Setup menu"),
            ScreenRoot
        ](
            node{ position_type: PositionType::Absolute }[;
                UiColor(Color::rgba(1.0, 1.0, 1.0, 0.1)),
                MenuCursor::default(),
                Name::new("Cursor")
            ],
            node[ui_assets.large_text("Tilt Charades"); Name::new("Title")],
            node[text("Pick your categories"); style! { margin: rect!(10 px), }],
            id(category_list),
            node{ flex_direction: FD::Row }[; Name::new("Selection shortcuts")](
                node[text("Select all"); focusable, SelectAll, style! { margin: rect!(20 px), }],
                node[text("Select none"); focusable, SelectNone, style! { margin: rect!(20 px), }]
            ),
            node{ flex_direction: FD::Row }[; Name::new("Player count")](
                node[text("-"); focusable, FewerPlayers, style! { margin: rect!(20 px), }],
                node[players_text; players_label],
                node[text("+"); focusable, MorePlayers, style! { margin: rect!(20 px), }]
            ),
            node[error_text; error_label],
            node[ui_assets.large_text("Start"); focusable, Start, Name::new("Start button")]
        )
    };
}

pub struct Plugin(pub GameState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::state::EasySystemSetCtor;
        app.add_system_set(self.0.on_enter(init))
            .add_system_set(self.0.on_update(update_menu).with_system(refresh_labels))
            .add_system_set(self.0.on_exit(despawn_screen));
    }
}
