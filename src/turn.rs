//! The turn engine: countdown, prompt flow, guesses and pause.
//!
//! # Architecture
//!
//! [`TurnEngine`] owns everything that changes during a game: the deck,
//! the players and their scores, the countdown and the current phase. It
//! never talks to the screen or the speakers directly. Instead every
//! operation queues [`Signal`]s that the caller drains with
//! [`TurnEngine::drain_signals`] and forwards to whoever cares (see
//! [`crate::game_flow`]).
//!
//! ## Phases
//!
//! ```text
//!  Idle --start_turn--> Running <--pause/resume--> Paused
//!                          |
//!             time out / deck empty
//!                          ↓
//!                        Ended --acknowledge_turn_end--> Running (next player)
//!                                          |
//!                                          → GameComplete (last player)
//! ```
//!
//! ## Countdown
//!
//! There is at most one live [`Countdown`]. It is created when a turn
//! starts or resumes, and dropped when pausing, when the turn ends and when
//! the game is reset. [`TurnEngine::advance`] feeds it frame time, each full
//! second elapsed is one [`TurnEngine::tick`]. Without a live countdown,
//! time doesn't pass.
use std::{fmt, mem, time::Duration};

use bevy::prelude::{debug, error, warn};
use enum_map::Enum;

use crate::{
    config::GameConfig,
    deck::{Deck, Prompt},
    rotation::{self, Player, Rotation},
    scoring::{GuessScore, ScoringPolicy},
};

const SECOND: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

/// Sounds the engine asks for.
#[derive(Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// One of the last seconds of a turn.
    LowTime,
    Correct,
    Incorrect,
    TurnEnd,
}

/// Notifications for the renderer and the audio.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    PromptLoaded { content: String, is_image: bool },
    /// `None` for a passed prompt.
    GuessResolved(Option<GuessScore>),
    Tick { remaining: u32, total: u32 },
    /// The turn of this player is over, with their score so far.
    TurnEnded(Player),
    GameComplete(Vec<Player>),
    Cue(Cue),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Running,
    Paused,
    Ended,
    GameComplete,
}

/// The active player index points to nobody.
///
/// This can't happen through [`rotation::advance`], so seeing it means
/// the engine is broken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingPlayer {
    pub index: usize,
    pub total: usize,
}
impl fmt::Display for MissingPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { index, total } = self;
        write!(f, "active player {index} does not exist, there are {total} players")
    }
}
impl std::error::Error for MissingPlayer {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnRules {
    pub turn_duration: u32,
    pub low_time_threshold: u32,
    pub scoring: ScoringPolicy,
}
impl Default for TurnRules {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}
impl From<&GameConfig> for TurnRules {
    fn from(config: &GameConfig) -> Self {
        Self {
            turn_duration: config.turn_duration.max(1),
            low_time_threshold: config.low_time_threshold,
            scoring: ScoringPolicy::new(config.bonus_time_limit),
        }
    }
}

/// The single running countdown.
#[derive(Debug, PartialEq, Eq)]
struct Countdown {
    id: u64,
    /// Time accumulated toward the next tick.
    carry: Duration,
}

pub struct TurnEngine {
    rules: TurnRules,
    deck: Deck,
    players: Vec<Player>,
    active: usize,
    phase: TurnPhase,
    time_remaining: u32,
    /// Value of `time_remaining` when the current prompt was shown.
    prompt_shown_at: u32,
    countdown: Option<Countdown>,
    countdowns_started: u64,
    signals: Vec<Signal>,
}
impl TurnEngine {
    pub fn new(deck: Deck, players: Vec<Player>, rules: TurnRules) -> Self {
        Self {
            time_remaining: rules.turn_duration,
            rules,
            deck,
            players,
            active: 0,
            phase: TurnPhase::Idle,
            prompt_shown_at: rules.turn_duration,
            countdown: None,
            countdowns_started: 0,
            signals: Vec::new(),
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }
    pub fn turn_duration(&self) -> u32 {
        self.rules.turn_duration
    }
    pub fn deck_cursor(&self) -> usize {
        self.deck.cursor()
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn active_index(&self) -> usize {
        self.active
    }
    pub fn active_player(&self) -> Result<&Player, MissingPlayer> {
        let total = self.players.len();
        self.players.get(self.active).ok_or(MissingPlayer { index: self.active, total })
    }
    /// Identifier of the live countdown, if any. A new one is issued each
    /// time the countdown (re)starts.
    pub fn countdown_id(&self) -> Option<u64> {
        self.countdown.as_ref().map(|c| c.id)
    }
    /// Whether guesses would be processed right now.
    pub fn accepts_guesses(&self) -> bool {
        self.phase == TurnPhase::Running && !self.deck.is_empty()
    }
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        mem::take(&mut self.signals)
    }

    fn emit(&mut self, signal: Signal) {
        self.signals.push(signal);
    }
    fn start_countdown(&mut self) {
        self.countdowns_started += 1;
        self.countdown = Some(Countdown { id: self.countdowns_started, carry: Duration::ZERO });
    }
    fn stop_countdown(&mut self) {
        self.countdown = None;
    }
    fn emit_tick(&mut self) {
        let (remaining, total) = (self.time_remaining, self.rules.turn_duration);
        self.emit(Signal::Tick { remaining, total });
    }

    /// Start the turn of the active player with a full clock.
    pub fn start_turn(&mut self) {
        if self.phase == TurnPhase::GameComplete {
            warn!("tried to start a turn after the game ended");
            return;
        }
        self.time_remaining = self.rules.turn_duration;
        self.deck.rewind();
        self.phase = TurnPhase::Running;
        self.emit_tick();
        self.load_prompt();
        if self.phase == TurnPhase::Running {
            self.start_countdown();
        }
    }

    /// Show the next non-blank prompt, ending the turn if there is none.
    fn load_prompt(&mut self) {
        if self.deck.prompts().iter().all(Prompt::is_blank) {
            if !self.deck.is_empty() {
                warn!("every prompt in the deck is blank");
            }
            self.end_turn();
            return;
        }
        loop {
            let prompt = match self.deck.current() {
                Some(prompt) => prompt.clone(),
                None => return self.end_turn(),
            };
            if prompt.is_blank() {
                self.deck.advance();
                continue;
            }
            let is_image = prompt.is_image_ref();
            self.emit(Signal::PromptLoaded { content: prompt.to_string(), is_image });
            self.prompt_shown_at = self.time_remaining;
            return;
        }
    }

    /// Feed frame time to the countdown, ticking once per full second.
    pub fn advance(&mut self, delta: Duration) {
        let mut due = 0;
        if let Some(countdown) = &mut self.countdown {
            countdown.carry += delta;
            while countdown.carry >= SECOND {
                countdown.carry -= SECOND;
                due += 1;
            }
        }
        for _ in 0..due {
            if self.countdown.is_none() {
                break;
            }
            self.tick();
        }
    }

    /// One second passes. Does nothing without a live countdown.
    pub fn tick(&mut self) {
        if self.phase != TurnPhase::Running || self.countdown.is_none() {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.emit_tick();
        let remaining = self.time_remaining;
        if remaining > 0 && remaining <= self.rules.low_time_threshold {
            self.emit(Signal::Cue(Cue::LowTime));
        }
        if remaining == 0 {
            self.end_turn();
        }
    }

    /// Resolve the current prompt. Ignored unless the turn is running.
    pub fn submit_guess(&mut self, outcome: GuessOutcome) -> Result<(), MissingPlayer> {
        if self.phase != TurnPhase::Running {
            debug!("ignoring {outcome:?} guess while {:?}", self.phase);
            return Ok(());
        }
        let total = self.players.len();
        let index = self.active;
        let player = self.players.get_mut(index).ok_or(MissingPlayer { index, total })?;
        match outcome {
            GuessOutcome::Correct => {
                let elapsed = i64::from(self.prompt_shown_at) - i64::from(self.time_remaining);
                let elapsed = i32::try_from(elapsed).unwrap_or(i32::MAX);
                let score = self.rules.scoring.score_guess(elapsed);
                player.score += score.points;
                self.emit(Signal::Cue(Cue::Correct));
                self.emit(Signal::GuessResolved(Some(score)));
            }
            GuessOutcome::Incorrect => {
                self.emit(Signal::Cue(Cue::Incorrect));
                self.emit(Signal::GuessResolved(None));
            }
        }
        self.deck.advance();
        self.load_prompt();
        Ok(())
    }

    /// Freeze the clock. Returns whether the engine paused.
    pub fn pause(&mut self) -> bool {
        if self.phase != TurnPhase::Running {
            return false;
        }
        self.phase = TurnPhase::Paused;
        self.stop_countdown();
        true
    }

    /// Restart the clock where it stopped. Returns whether the engine resumed.
    pub fn resume(&mut self) -> bool {
        if self.phase != TurnPhase::Paused {
            return false;
        }
        self.phase = TurnPhase::Running;
        self.start_countdown();
        self.emit_tick();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Run out the clock of the current turn right away.
    pub fn expire(&mut self) {
        if matches!(self.phase, TurnPhase::Running | TurnPhase::Paused) {
            self.time_remaining = 0;
            self.emit_tick();
            self.end_turn();
        }
    }

    fn end_turn(&mut self) {
        self.stop_countdown();
        self.phase = TurnPhase::Ended;
        self.emit(Signal::Cue(Cue::TurnEnd));
        match self.active_player().map(Player::clone) {
            Ok(player) => self.emit(Signal::TurnEnded(player)),
            Err(err) => error!("turn ended without a player: {err}"),
        }
    }

    /// Leave the end-of-turn screen: next player, or end of the game.
    pub fn acknowledge_turn_end(&mut self) {
        if self.phase != TurnPhase::Ended {
            return;
        }
        match rotation::advance(self.active, &self.players) {
            Rotation::NextPlayer(next) => {
                self.active = next;
                self.start_turn();
            }
            Rotation::GameComplete(ranking) => {
                self.stop_countdown();
                self.phase = TurnPhase::GameComplete;
                self.emit(Signal::GameComplete(ranking));
            }
        }
    }

    /// Stop everything, the engine is about to be dropped.
    pub fn reset(&mut self) {
        self.stop_countdown();
        self.phase = TurnPhase::Idle;
        self.signals.clear();
    }
}
