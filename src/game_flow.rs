//! Game flow driver, glues the [`TurnEngine`] to the rest of the app.
//!
//! # Architecture
//!
//! This module does:
//! * Start a game from the setup screen choices ([`GameSetup`]), building
//!   the deck and seating the players, see [`ActiveGame::start`].
//! * Feed the engine every frame while [`GameState::Playing`]:
//!   * frame time, to run the countdown ([`run_countdown`]),
//!   * [`GuessEvent`]s from [`crate::input`] ([`apply_guesses`]),
//!   * pause, end-of-turn and quit requests ([`handle_requests`]).
//! * Forward the engine [`Signal`]s: sounds go out as [`AudioRequest`]s,
//!   everything goes to the ui as [`TurnSignal`]s ([`dispatch_signals`]).
//! * Enter [`GameState::Results`] with the [`FinalRanking`] once the last
//!   player is done.
//!
//! Leaving [`GameState::Playing`] by any path stops the countdown.
use bevy::input::gamepad::GamepadButtonType;
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_debug_text_overlay::screen_print;

use crate::{
    audio::AudioRequest,
    category::CategoryStore,
    config::GameConfig,
    deck::{build_deck, Deck, StartError},
    input::{GuessEvent, GuessInput},
    rotation::{seat_players, Player, PlayerCount},
    state::GameState,
    turn::{Signal, TurnEngine, TurnPhase, TurnRules},
};

/// What the players picked on the setup screen.
pub struct GameSetup {
    /// Category ids in the order they were selected.
    pub selected: Vec<String>,
    pub players: PlayerCount,
    /// Why the last start attempt failed.
    pub error: Option<StartError>,
}
impl FromWorld for GameSetup {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
        let players =
            PlayerCount::new(config.default_players, config.min_players, config.max_players);
        Self { selected: Vec::new(), players, error: None }
    }
}
impl GameSetup {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }
    pub fn toggle(&mut self, id: &str) {
        match self.selected.iter().position(|s| s == id) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(id.to_owned()),
        }
    }
    pub fn select_all(&mut self, store: &CategoryStore) {
        for category in store.listed() {
            if !self.is_selected(&category.id) {
                self.selected.push(category.id.clone());
            }
        }
    }
    pub fn select_none(&mut self) {
        self.selected.clear();
    }
}

/// The game being played, if any.
#[derive(Default)]
pub struct ActiveGame(Option<TurnEngine>);
impl ActiveGame {
    pub fn engine(&self) -> Option<&TurnEngine> {
        self.0.as_ref()
    }
    pub fn engine_mut(&mut self) -> Option<&mut TurnEngine> {
        self.0.as_mut()
    }
    /// Set up a new game, replacing the current one. The first turn starts
    /// when entering [`GameState::Playing`].
    pub fn start(
        &mut self,
        setup: &GameSetup,
        store: &CategoryStore,
        config: &GameConfig,
        rng: fastrand::Rng,
    ) -> Result<(), StartError> {
        let prompts = build_deck(&setup.selected, store, &rng)?;
        let players = seat_players(setup.players, &config.player_colors);
        info!("starting a game, {} players, {} prompts", players.len(), prompts.len());
        self.clear();
        let deck = Deck::new(prompts, rng);
        self.0 = Some(TurnEngine::new(deck, players, TurnRules::from(config)));
        Ok(())
    }
    pub fn clear(&mut self) {
        if let Some(engine) = self.0.as_mut() {
            engine.reset();
        }
        self.0 = None;
    }
}

/// Players from best to worst, once the game is over.
#[derive(Default)]
pub struct FinalRanking(pub Vec<Player>);

/// Engine notifications, for the ui.
pub struct TurnSignal(pub Signal);

/// Requests from the player that are not guesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowRequest {
    TogglePause,
    AcknowledgeTurnEnd,
    Quit,
}

fn begin_first_turn(mut game: ResMut<ActiveGame>, mut input: ResMut<GuessInput>, time: Res<Time>) {
    match game.engine_mut() {
        Some(engine) => {
            engine.start_turn();
            input.arm(time.time_since_startup());
        }
        None => error!("entered the game without setting one up"),
    }
}

fn run_countdown(mut game: ResMut<ActiveGame>, time: Res<Time>) {
    if let Some(engine) = game.engine_mut() {
        engine.advance(time.delta());
        screen_print!("player {} time {}", engine.active_index() + 1, engine.time_remaining());
    }
}

fn apply_guesses(mut events: EventReader<GuessEvent>, mut game: ResMut<ActiveGame>) {
    let engine = match game.engine_mut() {
        Some(engine) => engine,
        None => return,
    };
    for GuessEvent(outcome) in events.iter() {
        if let Err(err) = engine.submit_guess(*outcome) {
            error!("guess dropped: {err}");
        }
    }
}

/// South doubles as the "correct" button, it only acknowledges a turn that
/// already ended.
fn gamepad_request(button: GamepadButtonType) -> Option<FlowRequest> {
    match button {
        GamepadButtonType::Start => Some(FlowRequest::TogglePause),
        GamepadButtonType::South => Some(FlowRequest::AcknowledgeTurnEnd),
        _ => None,
    }
}

fn player_requests(
    mut keys: ResMut<Input<KeyCode>>,
    buttons: Res<Input<GamepadButton>>,
    mut requests: EventWriter<FlowRequest>,
) {
    if keys.just_pressed(KeyCode::Escape) || keys.just_pressed(KeyCode::P) {
        keys.reset(KeyCode::Escape);
        requests.send(FlowRequest::TogglePause);
    }
    if keys.just_pressed(KeyCode::Return) || keys.just_pressed(KeyCode::Space) {
        requests.send(FlowRequest::AcknowledgeTurnEnd);
    }
    for &GamepadButton(_, button) in buttons.get_just_pressed() {
        if let Some(request) = gamepad_request(button) {
            requests.send(request);
        }
    }
}

fn handle_requests(
    mut requests: EventReader<FlowRequest>,
    mut game: ResMut<ActiveGame>,
    mut input: ResMut<GuessInput>,
    mut state: ResMut<State<GameState>>,
    time: Res<Time>,
) {
    let engine = match game.engine_mut() {
        Some(engine) => engine,
        None => return,
    };
    for request in requests.iter() {
        match request {
            FlowRequest::TogglePause => {
                engine.toggle_pause();
            }
            FlowRequest::AcknowledgeTurnEnd if engine.phase() == TurnPhase::Ended => {
                engine.acknowledge_turn_end();
                if engine.phase() == TurnPhase::Running {
                    screen_print!(sec: 2.0, "turn of player {}", engine.active_index() + 1);
                    input.arm(time.time_since_startup());
                }
            }
            FlowRequest::AcknowledgeTurnEnd => {}
            FlowRequest::Quit => {
                info!("game abandoned");
                if let Err(err) = state.set(GameState::Setup) {
                    warn!("could not leave the game: {err:?}");
                }
                return;
            }
        }
    }
}

fn dispatch_signals(
    mut game: ResMut<ActiveGame>,
    mut state: ResMut<State<GameState>>,
    mut ui_signals: EventWriter<TurnSignal>,
    mut audio_requests: EventWriter<AudioRequest>,
    mut ranking: ResMut<FinalRanking>,
) {
    let signals = match game.engine_mut() {
        Some(engine) => engine.drain_signals(),
        None => return,
    };
    for signal in signals {
        match &signal {
            Signal::Cue(cue) => audio_requests.send(AudioRequest::Cue(*cue)),
            Signal::TurnEnded(player) => {
                info!("turn of player {} over, {} points", player.id, player.score);
            }
            Signal::GameComplete(players) => {
                info!("game over, player {} wins", players.first().map_or(0, |p| p.id));
                ranking.0 = players.clone();
                if let Err(err) = state.set(GameState::Results) {
                    warn!("could not show results: {err:?}");
                }
            }
            _ => {}
        }
        ui_signals.send(TurnSignal(signal));
    }
}

fn stop_game(mut game: ResMut<ActiveGame>) {
    game.clear();
}

fn clear_setup_error(mut setup: ResMut<GameSetup>) {
    setup.error = None;
}

#[cfg(feature = "debug")]
fn debug_buttons(
    mut ctx: ResMut<bevy_inspector_egui::bevy_egui::EguiContext>,
    mut game: ResMut<ActiveGame>,
) {
    use bevy_inspector_egui::egui::*;
    Area::new("game_flow::debug_buttons")
        .anchor(Align2::RIGHT_BOTTOM, vec2(0., 0.))
        .show(ctx.ctx_mut(), |ui| {
            if ui.button("Time up").clicked() {
                if let Some(engine) = game.engine_mut() {
                    engine.expire();
                }
            }
        });
}

pub struct Plugin(pub GameState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::state::EasySystemSetCtor;
        app.add_event::<TurnSignal>()
            .add_event::<FlowRequest>()
            .init_resource::<ActiveGame>()
            .init_resource::<GameSetup>()
            .init_resource::<FinalRanking>()
            .add_system_set(self.0.on_enter(begin_first_turn).with_system(clear_setup_error))
            .add_system_set(
                self.0
                    .on_update(player_requests.label("flow_input"))
                    .with_system(run_countdown.label("drive_engine"))
                    .with_system(apply_guesses.label("drive_engine").after("guess_input"))
                    .with_system(
                        handle_requests.label("drive_engine").after("flow_input").after("guess_input"),
                    )
                    .with_system(dispatch_signals.after("drive_engine")),
            )
            .add_system_set(self.0.on_exit(stop_game));

        #[cfg(feature = "debug")]
        app.add_system_set(self.0.on_update(debug_buttons));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryData;

    fn store() -> CategoryStore {
        let mut store = CategoryStore::default();
        let prompts = vec![Some("cat".to_owned()), Some("dog".to_owned())];
        store.register("animals", CategoryData { display_name: "Animals".into(), prompts });
        store.register("empty", CategoryData { display_name: "Empty".into(), prompts: vec![] });
        store
    }
    fn setup(selected: &[&str], players: u8) -> GameSetup {
        GameSetup {
            selected: selected.iter().map(|s| s.to_string()).collect(),
            players: PlayerCount::new(players, 2, 8),
            error: None,
        }
    }

    #[test]
    fn start_a_game() {
        let mut game = ActiveGame::default();
        let config = GameConfig::default();
        let rng = fastrand::Rng::with_seed(2);
        game.start(&setup(&["animals"], 4), &store(), &config, rng).unwrap();
        let engine = game.engine().unwrap();
        assert_eq!(engine.players().len(), 4);
        assert_eq!(engine.phase(), TurnPhase::Idle);
        assert_eq!(engine.turn_duration(), 60);
    }

    #[test]
    fn start_errors_keep_the_previous_state() {
        let mut game = ActiveGame::default();
        let config = GameConfig::default();
        let rng = || fastrand::Rng::with_seed(2);
        let err = game.start(&setup(&[], 2), &store(), &config, rng()).unwrap_err();
        assert_eq!(err, StartError::EmptySelection);
        let err = game.start(&setup(&["empty"], 2), &store(), &config, rng()).unwrap_err();
        assert_eq!(err, StartError::EmptyDeck);
        assert!(game.engine().is_none());
    }

    #[test]
    fn clearing_stops_the_countdown() {
        let mut game = ActiveGame::default();
        let rng = fastrand::Rng::with_seed(2);
        game.start(&setup(&["animals"], 2), &store(), &GameConfig::default(), rng).unwrap();
        let engine = game.engine_mut().unwrap();
        engine.start_turn();
        assert!(engine.countdown_id().is_some());
        game.clear();
        assert!(game.engine().is_none());
    }

    #[test]
    fn selection_keeps_order() {
        let mut setup = setup(&[], 2);
        setup.toggle("food");
        setup.toggle("animals");
        setup.toggle("cities");
        setup.toggle("animals");
        assert_eq!(setup.selected, ["food", "cities"]);
        assert!(setup.is_selected("food"));
        assert!(!setup.is_selected("animals"));

        setup.select_all(&store());
        assert_eq!(setup.selected, ["food", "cities", "animals", "empty"]);
        setup.select_none();
        assert!(setup.selected.is_empty());
    }

    #[test]
    fn gamepad_pauses_and_acknowledges() {
        use GamepadButtonType::*;
        assert_eq!(gamepad_request(Start), Some(FlowRequest::TogglePause));
        assert_eq!(gamepad_request(South), Some(FlowRequest::AcknowledgeTurnEnd));
        assert_eq!(gamepad_request(East), None);
        assert_eq!(gamepad_request(Select), None);
    }
}
