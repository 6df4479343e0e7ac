//! What the players see during a game.
//!
//! The screen only reacts to [`TurnSignal`]s and reads the engine phase to
//! show the pause and end of turn overlays. Buttons send [`TapEvent`]s and
//! [`FlowRequest`]s, never touch the engine directly.
use std::time::Duration;

use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy::window::WindowMode;

use super::common::*;
use crate::{
    audio::AudioRequest,
    game_flow::{ActiveGame, FlowRequest, TurnSignal},
    input::TapEvent,
    rotation::Player,
    turn::{GuessOutcome, Signal, TurnPhase},
};

const CORRECT_FLASH: Color = Color::rgb(0.29, 0.87, 0.5);
const PASS_FLASH: Color = Color::rgb(0.97, 0.44, 0.44);
const FLASH_TIME: f32 = 0.3;
const FEEDBACK_TIME: f32 = 1.0;
/// Prompts longer than this use a smaller font.
const LONG_PROMPT: usize = 15;

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum GameText {
    Badge,
    Timer,
    Prompt,
    Feedback,
    TurnSummary,
}

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum GameNode {
    Progress,
    PromptImage,
    PauseOverlay,
    TurnOverlay,
}

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum GameButton {
    Guess(GuessOutcome),
    Pause,
    Continue,
    ToggleFullScreen,
    ToggleMute,
    Quit,
    NextTurn,
}

/// Short lived visual effects: background flash and score feedback.
struct ScreenEffects {
    background: Color,
    flash: Option<(Color, Timer)>,
    feedback: Option<Timer>,
}
impl Default for ScreenEffects {
    fn default() -> Self {
        Self { background: BACKGROUND, flash: None, feedback: None }
    }
}
impl ScreenEffects {
    fn flash(&mut self, color: Color) {
        self.flash = Some((color, Timer::from_seconds(FLASH_TIME, false)));
    }
    fn tick(&mut self, delta: Duration) -> Color {
        if let Some((_, timer)) = &mut self.flash {
            timer.tick(delta);
        }
        if matches!(&self.flash, Some((_, timer)) if timer.finished()) {
            self.flash = None;
        }
        self.flash.as_ref().map_or(self.background, |(color, _)| *color)
    }
}

fn feedback_text(signal: &Signal) -> Option<String> {
    match signal {
        Signal::GuessResolved(Some(score)) if score.bonus => Some(format!("+{} 🔥", score.points)),
        Signal::GuessResolved(Some(score)) => Some(format!("+{}", score.points)),
        Signal::GuessResolved(None) => Some("Pass".to_owned()),
        _ => None,
    }
}

fn prompt_font_size(content: &str) -> f32 {
    if content.chars().count() > LONG_PROMPT {
        64.0
    } else {
        90.0
    }
}

fn turn_summary(player: &Player, last: bool) -> String {
    let next = if last { "Time to see who won!" } else { "Pass the device along." };
    format!("Player {}\n{} points\n{next}", player.id, player.score)
}

fn set_text(texts: &mut Query<(&mut Text, &GameText)>, kind: GameText, content: &str) {
    for (mut text, text_kind) in texts.iter_mut() {
        if *text_kind == kind {
            text.sections[0].value = content.to_owned();
        }
    }
}

fn render_signals(
    mut signals: EventReader<TurnSignal>,
    mut texts: Query<(&mut Text, &GameText)>,
    mut nodes: Query<(&mut Style, &GameNode)>,
    mut images: Query<&mut UiImage, With<GameNode>>,
    mut effects: ResMut<ScreenEffects>,
    game: Res<ActiveGame>,
    assets: Res<AssetServer>,
) {
    for TurnSignal(signal) in signals.iter() {
        match signal {
            Signal::PromptLoaded { content, is_image } => {
                let shown = if *is_image { "" } else { content.as_str() };
                for (mut text, kind) in texts.iter_mut() {
                    if *kind == GameText::Prompt {
                        text.sections[0].value = shown.to_owned();
                        text.sections[0].style.font_size = prompt_font_size(shown);
                    }
                }
                for (mut style, kind) in nodes.iter_mut() {
                    if *kind == GameNode::PromptImage {
                        style.display = if *is_image { Display::Flex } else { Display::None };
                    }
                }
                if *is_image {
                    for mut image in images.iter_mut() {
                        *image = assets.load(content.as_str()).into();
                    }
                }
            }
            Signal::GuessResolved(score) => {
                effects.flash(if score.is_some() { CORRECT_FLASH } else { PASS_FLASH });
                effects.feedback = Some(Timer::from_seconds(FEEDBACK_TIME, false));
                let feedback = feedback_text(signal).unwrap_or_default();
                set_text(&mut texts, GameText::Feedback, &feedback);
            }
            Signal::Tick { remaining, total } => {
                set_text(&mut texts, GameText::Timer, &remaining.to_string());
                let ratio = *remaining as f32 / (*total).max(1) as f32;
                for (mut style, kind) in nodes.iter_mut() {
                    if *kind == GameNode::Progress {
                        style.size.width = Val::Percent(ratio * 100.0);
                    }
                }
                if let Some(Ok(player)) = game.engine().map(|e| e.active_player()) {
                    effects.background = hex_color(&player.color);
                    set_text(&mut texts, GameText::Badge, &format!("Player {}", player.id));
                }
            }
            Signal::TurnEnded(player) => {
                let last = game
                    .engine()
                    .map_or(true, |e| e.active_index() + 1 >= e.players().len());
                set_text(&mut texts, GameText::TurnSummary, &turn_summary(player, last));
            }
            Signal::GameComplete(_) | Signal::Cue(_) => {}
        }
    }
}

fn update_effects(
    time: Res<Time>,
    mut effects: ResMut<ScreenEffects>,
    mut clear_color: ResMut<ClearColor>,
    mut texts: Query<(&mut Text, &GameText)>,
) {
    clear_color.0 = effects.tick(time.delta());
    if let Some(timer) = &mut effects.feedback {
        if timer.tick(time.delta()).just_finished() {
            for (mut text, kind) in texts.iter_mut() {
                if *kind == GameText::Feedback {
                    text.sections[0].value.clear();
                }
            }
        }
    }
}

fn sync_overlays(game: Res<ActiveGame>, mut nodes: Query<(&mut Style, &GameNode)>) {
    let phase = game.engine().map_or(TurnPhase::Idle, |e| e.phase());
    for (mut style, kind) in nodes.iter_mut() {
        let shown = match kind {
            GameNode::PauseOverlay => phase == TurnPhase::Paused,
            GameNode::TurnOverlay => phase == TurnPhase::Ended,
            _ => continue,
        };
        let display = if shown { Display::Flex } else { Display::None };
        if style.display != display {
            style.display = display;
        }
    }
}

fn toggle_fullscreen(windows: &mut Windows) {
    use WindowMode::*;
    if let Some(window) = windows.get_primary_mut() {
        let new_mode =
            if window.mode() == BorderlessFullscreen { Windowed } else { BorderlessFullscreen };
        window.set_mode(new_mode);
    }
}

fn game_buttons(
    interactions: Query<(&Interaction, &GameButton), Changed<Interaction>>,
    mut taps: EventWriter<TapEvent>,
    mut requests: EventWriter<FlowRequest>,
    mut audio_requests: EventWriter<AudioRequest>,
    mut windows: ResMut<Windows>,
) {
    for (interaction, button) in interactions.iter() {
        if *interaction != Interaction::Clicked {
            continue;
        }
        match button {
            GameButton::Guess(outcome) => taps.send(TapEvent(*outcome)),
            GameButton::Pause | GameButton::Continue => requests.send(FlowRequest::TogglePause),
            GameButton::NextTurn => requests.send(FlowRequest::AcknowledgeTurnEnd),
            GameButton::Quit => requests.send(FlowRequest::Quit),
            GameButton::ToggleMute => audio_requests.send(AudioRequest::ToggleMute),
            GameButton::ToggleFullScreen => toggle_fullscreen(&mut windows),
        }
    }
}

fn overlay() -> NodeBundle {
    NodeBundle {
        color: Color::rgba(0.0, 0.0, 0.0, 0.85).into(),
        style: Style {
            display: Display::None,
            position_type: PositionType::Absolute,
            size: Size::new(Val::Percent(100.0), Val::Percent(100.0)),
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn button(
    parent: &mut ChildBuilder,
    ui_assets: &UiAssets,
    label: &str,
    color: Color,
    kind: GameButton,
) {
    parent.spawn_bundle(ui_assets.button(color)).insert(kind).with_children(|parent| {
        parent.spawn_bundle(ui_assets.text_bundle(label, 40.0));
    });
}

fn init(mut cmds: Commands, ui_assets: Res<UiAssets>, mut effects: ResMut<ScreenEffects>) {
    *effects = ScreenEffects::default();
    let row = |justify_content| NodeBundle {
        color: Color::NONE.into(),
        style: Style {
            size: Size::new(Val::Percent(100.0), Val::Auto),
            flex_direction: FlexDirection::Row,
            justify_content,
            align_items: AlignItems::Center,
            ..Default::default()
        },
        ..Default::default()
    };
    let ui_assets = &*ui_assets;
    let dark = Color::rgba(1.0, 1.0, 1.0, 0.15);

    cmds.spawn_bundle(NodeBundle {
        color: Color::NONE.into(),
        style: Style {
            size: Size::new(Val::Percent(100.0), Val::Percent(100.0)),
            flex_direction: FlexDirection::ColumnReverse,
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::Center,
            ..Default::default()
        },
        ..Default::default()
    })
    .insert_bundle((ScreenRoot, Name::new("Game screen")))
    .with_children(|parent| {
        parent.spawn_bundle(row(JustifyContent::SpaceBetween)).with_children(|parent| {
            parent.spawn_bundle(ui_assets.text_bundle("", 40.0)).insert(GameText::Badge);
            button(parent, ui_assets, "II", dark, GameButton::Pause);
            parent.spawn_bundle(ui_assets.large_text("")).insert(GameText::Timer);
        });
        parent
            .spawn_bundle(NodeBundle {
                color: dark.into(),
                style: Style {
                    size: Size::new(Val::Percent(90.0), Val::Px(16.0)),
                    ..Default::default()
                },
                ..Default::default()
            })
            .insert(Name::new("Progress bar"))
            .with_children(|parent| {
                parent
                    .spawn_bundle(NodeBundle {
                        color: TEXT_COLOR.into(),
                        style: Style {
                            size: Size::new(Val::Percent(100.0), Val::Percent(100.0)),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                    .insert(GameNode::Progress);
            });
        parent
            .spawn_bundle(NodeBundle {
                color: Color::NONE.into(),
                style: Style {
                    flex_grow: 1.0,
                    flex_direction: FlexDirection::ColumnReverse,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..Default::default()
                },
                ..Default::default()
            })
            .insert(Name::new("Prompt area"))
            .with_children(|parent| {
                parent.spawn_bundle(ui_assets.large_text("")).insert(GameText::Prompt);
                parent
                    .spawn_bundle(ImageBundle {
                        style: Style {
                            display: Display::None,
                            size: Size::new(Val::Auto, Val::Px(300.0)),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                    .insert(GameNode::PromptImage);
                parent
                    .spawn_bundle(ui_assets.colored_text("", 60.0, Color::GOLD))
                    .insert(GameText::Feedback);
            });
        parent.spawn_bundle(row(JustifyContent::SpaceAround)).with_children(|parent| {
            let (pass, correct) = (GuessOutcome::Incorrect, GuessOutcome::Correct);
            button(parent, ui_assets, "Pass", PASS_FLASH, GameButton::Guess(pass));
            button(parent, ui_assets, "Correct", CORRECT_FLASH, GameButton::Guess(correct));
        });

        parent.spawn_bundle(overlay()).insert(GameNode::PauseOverlay).with_children(|parent| {
            parent.spawn_bundle(ui_assets.large_text("Paused"));
            button(parent, ui_assets, "Continue", dark, GameButton::Continue);
            button(parent, ui_assets, "Toggle full screen", dark, GameButton::ToggleFullScreen);
            button(parent, ui_assets, "Sound on/off", dark, GameButton::ToggleMute);
            button(parent, ui_assets, "Quit game", PASS_FLASH, GameButton::Quit);
        });
        parent.spawn_bundle(overlay()).insert(GameNode::TurnOverlay).with_children(|parent| {
            parent.spawn_bundle(ui_assets.text_bundle("TIME!", 90.0));
            parent.spawn_bundle(ui_assets.text_bundle("", 40.0)).insert(GameText::TurnSummary);
            button(parent, ui_assets, "Continue", CORRECT_FLASH, GameButton::NextTurn);
        });
    });
}

fn cleanup(mut clear_color: ResMut<ClearColor>) {
    clear_color.0 = BACKGROUND;
}

pub struct Plugin(pub crate::state::GameState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::state::EasySystemSetCtor;
        app.init_resource::<ScreenEffects>()
            .add_system_set(self.0.on_enter(init))
            .add_system_set(
                self.0
                    .on_update(game_buttons.before("guess_input").before("flow_input"))
                    .with_system(render_signals.before("screen_effects"))
                    .with_system(update_effects.label("screen_effects"))
                    .with_system(sync_overlays),
            )
            .add_system_set(self.0.on_exit(despawn_screen).with_system(cleanup));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::GuessScore;

    #[test]
    fn feedback_marks_bonus_guesses() {
        let bonus = Signal::GuessResolved(Some(GuessScore { points: 400, bonus: true }));
        let regular = Signal::GuessResolved(Some(GuessScore { points: 100, bonus: false }));
        assert_eq!(feedback_text(&bonus).as_deref(), Some("+400 🔥"));
        assert_eq!(feedback_text(&regular).as_deref(), Some("+100"));
        assert_eq!(feedback_text(&Signal::GuessResolved(None)).as_deref(), Some("Pass"));
        assert_eq!(feedback_text(&Signal::Cue(crate::turn::Cue::LowTime)), None);
    }

    #[test]
    fn long_prompts_are_smaller() {
        assert_eq!(prompt_font_size("Elephant"), 90.0);
        assert_eq!(prompt_font_size("Fifteen letters"), 90.0);
        assert_eq!(prompt_font_size("The Lord of the Rings"), 64.0);
    }

    #[test]
    fn flash_fades_back_to_player_color() {
        let mut effects = ScreenEffects::default();
        effects.background = Color::BLUE;
        effects.flash(CORRECT_FLASH);
        assert_eq!(effects.tick(Duration::from_millis(100)), CORRECT_FLASH);
        assert_eq!(effects.tick(Duration::from_millis(250)), Color::BLUE);
        assert!(effects.flash.is_none());
    }
}
