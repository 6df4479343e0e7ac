//! Turn player input into guesses.
//!
//! Two channels exist:
//! * taps: a key, a gamepad button or an on-screen button, each press is
//!   one guess.
//! * tilt: a stream of angles (a device sensor, or the gamepad stick mapped
//!   to ±90°). Tilting past the threshold to the right is a correct guess,
//!   to the left a pass. Angle streams are noisy, so after a gesture is
//!   accepted, the channel stays deaf for the configured cooldown.
//!
//! Both end up as [`GuessEvent`]s, consumed by [`crate::game_flow`].
use std::time::Duration;

use bevy::input::gamepad::{GamepadAxisType, GamepadButtonType};
use bevy::prelude::{Plugin as BevyPlugin, *};

use crate::{config::GameConfig, game_flow::ActiveGame, state::GameState, turn::GuessOutcome};

/// A guess to submit to the turn engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessEvent(pub GuessOutcome);

/// An on-screen guess button was pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapEvent(pub GuessOutcome);

/// Device tilt angle in degrees, positive to the right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltReading(pub f32);

/// Filters the two input channels into guesses.
#[derive(Clone, Debug, PartialEq)]
pub struct GuessInput {
    tilt_threshold: f32,
    cooldown: Duration,
    grace: Duration,
    /// When the last tilt gesture was accepted. May be in the future, see
    /// [`GuessInput::arm`].
    last_gesture: Option<Duration>,
}
impl Default for GuessInput {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
impl GuessInput {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            tilt_threshold: config.tilt_threshold.abs(),
            cooldown: config.cooldown(),
            grace: config.grace(),
            last_gesture: None,
        }
    }

    /// A turn starts at `now`: hold off gestures for a little longer than
    /// the cooldown, the device is still being raised to the forehead.
    pub fn arm(&mut self, now: Duration) {
        self.last_gesture = Some(now + self.grace);
    }

    /// A tap is always a guess while the game accepts guesses.
    pub fn tap(&self, outcome: GuessOutcome, live: bool) -> Option<GuessOutcome> {
        live.then(|| outcome)
    }

    /// Handle one tilt reading taken at `now`.
    pub fn tilt(&mut self, angle: f32, now: Duration, live: bool) -> Option<GuessOutcome> {
        if !live || angle.is_nan() {
            return None;
        }
        if let Some(last) = self.last_gesture {
            if now < last + self.cooldown {
                return None;
            }
        }
        let outcome = if angle > self.tilt_threshold {
            GuessOutcome::Correct
        } else if angle < -self.tilt_threshold {
            GuessOutcome::Incorrect
        } else {
            return None;
        };
        self.last_gesture = Some(now);
        Some(outcome)
    }
}

fn guesses_live(game: &ActiveGame) -> bool {
    game.engine().map_or(false, |engine| engine.accepts_guesses())
}

fn taps(
    mut screen_taps: EventReader<TapEvent>,
    keys: Res<Input<KeyCode>>,
    buttons: Res<Input<GamepadButton>>,
    input: Res<GuessInput>,
    game: Res<ActiveGame>,
    mut guesses: EventWriter<GuessEvent>,
) {
    use GuessOutcome::{Correct, Incorrect};
    let live = guesses_live(&game);
    let mut taps: Vec<_> = screen_taps.iter().map(|TapEvent(outcome)| *outcome).collect();
    for key in keys.get_just_pressed() {
        match key {
            KeyCode::Right | KeyCode::Up => taps.push(Correct),
            KeyCode::Left | KeyCode::Down => taps.push(Incorrect),
            _ => {}
        }
    }
    for &GamepadButton(_, button) in buttons.get_just_pressed() {
        match button {
            GamepadButtonType::South => taps.push(Correct),
            GamepadButtonType::East => taps.push(Incorrect),
            _ => {}
        }
    }
    for outcome in taps {
        if let Some(outcome) = input.tap(outcome, live) {
            guesses.send(GuessEvent(outcome));
        }
    }
}

/// The left stick stands in for the device tilt sensor.
fn gamepad_tilt(
    gamepads: Res<Gamepads>,
    axes: Res<Axis<GamepadAxis>>,
    mut readings: EventWriter<TiltReading>,
) {
    for gamepad in gamepads.iter() {
        let axis = GamepadAxis(*gamepad, GamepadAxisType::LeftStickX);
        if let Some(x) = axes.get(axis) {
            readings.send(TiltReading(x * 90.0));
        }
    }
}

fn tilt_gestures(
    mut readings: EventReader<TiltReading>,
    mut input: ResMut<GuessInput>,
    mut guesses: EventWriter<GuessEvent>,
    game: Res<ActiveGame>,
    time: Res<Time>,
) {
    let live = guesses_live(&game);
    let now = time.time_since_startup();
    for TiltReading(angle) in readings.iter() {
        if let Some(outcome) = input.tilt(*angle, now, live) {
            guesses.send(GuessEvent(outcome));
        }
    }
}

pub struct Plugin(pub GameState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::state::EasySystemSetCtor;
        app.add_event::<GuessEvent>()
            .add_event::<TapEvent>()
            .add_event::<TiltReading>()
            .add_system_set(
                self.0
                    .on_update(taps.label("guess_input"))
                    .with_system(gamepad_tilt.before("tilt_gestures"))
                    .with_system(tilt_gestures.label("tilt_gestures").label("guess_input")),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GuessOutcome::{Correct, Incorrect};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn tilt_past_threshold() {
        let mut input = GuessInput::default();
        assert_eq!(input.tilt(75.0, ms(0), true), Some(Correct));
        assert_eq!(input.tilt(-75.0, ms(5_000), true), Some(Incorrect));
    }

    #[test]
    fn readings_within_threshold_are_ignored() {
        let mut input = GuessInput::default();
        for angle in [-60.0, -30.0, 0.0, 59.9, 60.0, f32::NAN] {
            assert_eq!(input.tilt(angle, ms(0), true), None, "angle = {angle}");
        }
        // Ignored readings don't start the cooldown.
        assert_eq!(input.tilt(61.0, ms(1), true), Some(Correct));
    }

    #[test]
    fn gestures_are_debounced() {
        let mut input = GuessInput::default();
        assert_eq!(input.tilt(80.0, ms(10_000), true), Some(Correct));
        assert_eq!(input.tilt(85.0, ms(10_100), true), None);
        assert_eq!(input.tilt(-85.0, ms(11_499), true), None);
        assert_eq!(input.tilt(-85.0, ms(11_500), true), Some(Incorrect));
    }

    #[test]
    fn two_fast_gestures_make_one_guess() {
        let mut input = GuessInput::default();
        let accepted = (0..30)
            .filter_map(|i| input.tilt(70.0, ms(2_000 + i * 50), true))
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn no_gesture_when_not_live() {
        let mut input = GuessInput::default();
        assert_eq!(input.tilt(90.0, ms(0), false), None);
        assert_eq!(input.tap(Correct, false), None);
        assert_eq!(input.tap(Incorrect, true), Some(Incorrect));
        // Refused readings don't start the cooldown either.
        assert_eq!(input.tilt(90.0, ms(1), true), Some(Correct));
    }

    #[test]
    fn turn_start_grace() {
        let mut input = GuessInput::default();
        input.arm(ms(1_000));
        assert_eq!(input.tilt(90.0, ms(1_000), true), None);
        assert_eq!(input.tilt(90.0, ms(3_499), true), None);
        assert_eq!(input.tilt(90.0, ms(3_500), true), Some(Correct));
    }

    #[test]
    fn custom_threshold() {
        let config = GameConfig { tilt_threshold: -20.0, cooldown_sensor: 0, ..Default::default() };
        let mut input = GuessInput::from_config(&config);
        assert_eq!(input.tilt(25.0, ms(0), true), Some(Correct));
        assert_eq!(input.tilt(-25.0, ms(0), true), Some(Incorrect));
        assert_eq!(input.tilt(15.0, ms(0), true), None);
    }
}
