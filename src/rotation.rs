//! Players, who plays next and the final ranking.
use std::cmp::Reverse;

use crate::config::PLAYER_BOUNDS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    /// 1-based, in seating order.
    pub id: u32,
    pub score: u32,
    /// Hex color from the configured palette.
    pub color: String,
}

/// Number of players in a game, always within the configured bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerCount {
    count: u8,
    min: u8,
    max: u8,
}
impl Default for PlayerCount {
    fn default() -> Self {
        Self::new(PLAYER_BOUNDS.0, PLAYER_BOUNDS.0, PLAYER_BOUNDS.1)
    }
}
impl PlayerCount {
    pub fn new(count: u8, min: u8, max: u8) -> Self {
        let min = min.max(PLAYER_BOUNDS.0);
        let max = max.clamp(min, PLAYER_BOUNDS.1.max(min));
        Self { count: count.clamp(min, max), min, max }
    }
    pub fn get(&self) -> u8 {
        self.count
    }
    /// Add `delta` players. Changes that would leave the bounds are
    /// ignored, returns whether the count changed.
    pub fn adjust(&mut self, delta: i8) -> bool {
        let new_count = self.count as i16 + delta as i16;
        if delta != 0 && (self.min as i16..=self.max as i16).contains(&new_count) {
            self.count = new_count as u8;
            true
        } else {
            false
        }
    }
}

/// Create the players of a new game, colors are assigned cyclically.
pub fn seat_players(count: PlayerCount, palette: &[String]) -> Vec<Player> {
    (0..count.get() as usize)
        .map(|i| Player {
            id: i as u32 + 1,
            score: 0,
            color: palette.get(i % palette.len().max(1)).cloned().unwrap_or_default(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    NextPlayer(usize),
    /// Everyone played, players ordered from best to worst.
    GameComplete(Vec<Player>),
}

/// Who plays after the player at `current`.
pub fn advance(current: usize, players: &[Player]) -> Rotation {
    let next = current + 1;
    if next < players.len() {
        Rotation::NextPlayer(next)
    } else {
        Rotation::GameComplete(rank(players))
    }
}

/// Sort by score, best first. Ties keep seating order.
pub fn rank(players: &[Player]) -> Vec<Player> {
    let mut ranked = players.to_vec();
    ranked.sort_by_key(|player| Reverse(player.score));
    ranked
}
