//! How many points a correct guess is worth.
//!
//! Only the time spent on the prompt matters: a prompt guessed within
//! [`ScoringPolicy::bonus_time_limit`] seconds of being shown is a bonus
//! guess, worth four times a regular one.

pub const BONUS_POINTS: u32 = 400;
pub const REGULAR_POINTS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessScore {
    pub points: u32,
    pub bonus: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub bonus_time_limit: i32,
}
impl Default for ScoringPolicy {
    fn default() -> Self {
        Self { bonus_time_limit: 10 }
    }
}
impl ScoringPolicy {
    pub fn new(bonus_time_limit: i32) -> Self {
        Self { bonus_time_limit }
    }

    /// Score a correct guess made `elapsed` seconds after the prompt showed.
    ///
    /// `elapsed` is zero when the guess lands on the same countdown tick as
    /// the prompt, and is not bounded above.
    pub fn score_guess(&self, elapsed: i32) -> GuessScore {
        if elapsed <= self.bonus_time_limit {
            GuessScore { points: BONUS_POINTS, bonus: true }
        } else {
            GuessScore { points: REGULAR_POINTS, bonus: false }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BONUS: GuessScore = GuessScore { points: 400, bonus: true };
    const REGULAR: GuessScore = GuessScore { points: 100, bonus: false };

    #[test]
    fn bonus_boundary() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.score_guess(10), BONUS);
        assert_eq!(policy.score_guess(11), REGULAR);
    }

    #[test]
    fn fast_guesses_are_bonus() {
        let policy = ScoringPolicy::default();
        for elapsed in -3..=10 {
            assert_eq!(policy.score_guess(elapsed), BONUS, "elapsed = {elapsed}");
        }
    }

    #[test]
    fn slow_guesses_are_regular() {
        let policy = ScoringPolicy::default();
        for elapsed in [11, 12, 30, 59, 600, i32::MAX] {
            assert_eq!(policy.score_guess(elapsed), REGULAR, "elapsed = {elapsed}");
        }
    }

    #[test]
    fn custom_limit() {
        let policy = ScoringPolicy::new(3);
        assert_eq!(policy.score_guess(3), BONUS);
        assert_eq!(policy.score_guess(4), REGULAR);
    }
}
