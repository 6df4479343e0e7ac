//! Game tuning knobs, read once from `assets/config.json` at startup.
//!
//! Every field has a default, so the file may set only what it wants to
//! change. A missing or broken file is not an error for the game: we log
//! it and play with [`GameConfig::default`].
use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use bevy::prelude::{info, warn};
use serde::Deserialize;

pub const CONFIG_PATH: &str = "assets/config.json";

/// Hard limits on how many players a single game may have.
pub const PLAYER_BOUNDS: (u8, u8) = (2, 8);

const DEFAULT_COLORS: [&str; 8] = [
    "FF4D4D", "4CAF50", "2196F3", "FFEB3B", "00BCD4", "FF9800", "E91E63", "9E9E9E",
];

#[rustfmt::skip]
const DEFAULT_CATEGORIES: [&str; 21] = [
    "animals", "movies_series", "sports", "music", "food_drink",
    "geography", "history_culture", "videogames", "jobs", "celebrities",
    "technology", "toys_games", "superheroes", "literature",
    "science", "vehicles", "fairy_tales",
    "retro_videogames", "mythology", "social_media", "world_cities",
];

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct GameConfig {
    /// Seconds per turn.
    pub turn_duration: u32,
    /// A correct guess made within this many seconds of the prompt showing
    /// up is a bonus guess.
    pub bonus_time_limit: i32,
    /// Last seconds of a turn (excluding zero) that beep.
    pub low_time_threshold: u32,
    /// Milliseconds between two accepted tilt gestures.
    pub cooldown_sensor: u64,
    /// Degrees the device must be tilted before a gesture counts.
    pub tilt_threshold: f32,
    /// Milliseconds added on top of the cooldown when a turn starts.
    pub turn_start_grace: u64,
    pub min_players: u8,
    pub max_players: u8,
    pub default_players: u8,
    /// Hex colors, assigned to players cyclically.
    pub player_colors: Vec<String>,
    /// Folder under `assets/` holding the `.category` files.
    pub category_folder: String,
    /// Category ids, each loaded from `<category_folder>/<id>.category`.
    pub category_files: Vec<String>,
}
impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_duration: 60,
            bonus_time_limit: 10,
            low_time_threshold: 5,
            cooldown_sensor: 1500,
            tilt_threshold: 60.0,
            turn_start_grace: 1000,
            min_players: PLAYER_BOUNDS.0,
            max_players: PLAYER_BOUNDS.1,
            default_players: PLAYER_BOUNDS.0,
            player_colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            category_folder: "categories".to_owned(),
            category_files: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}
impl GameConfig {
    /// Read and sanitize the config at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("bad config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Load [`CONFIG_PATH`], falling back to defaults.
    pub fn load_or_default() -> Self {
        match Self::from_file(CONFIG_PATH) {
            Ok(config) => {
                info!("using config from {CONFIG_PATH}");
                config
            }
            Err(err) => {
                warn!("{err:#}, using default config");
                Self::default()
            }
        }
    }

    /// Clamp values that would break the game rules into their valid range.
    pub fn sanitized(mut self) -> Self {
        let (lower, upper) = PLAYER_BOUNDS;
        self.turn_duration = self.turn_duration.max(1);
        self.min_players = self.min_players.clamp(lower, upper);
        self.max_players = self.max_players.clamp(self.min_players, upper);
        self.default_players = self.default_players.clamp(self.min_players, self.max_players);
        if self.player_colors.is_empty() {
            self.player_colors = Self::default().player_colors;
        }
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_sensor)
    }
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.turn_start_grace)
    }
    pub fn category_path(&self, id: &str) -> String {
        format!("{}/{id}.category", self.category_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(GameConfig::from_json("{}").unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = GameConfig::from_json(r#"{ "turn_duration": 90 }"#).unwrap();
        assert_eq!(config.turn_duration, 90);
        assert_eq!(config.bonus_time_limit, 10);
        assert_eq!(config.cooldown(), Duration::from_millis(1500));
    }

    #[test]
    fn player_bounds_are_clamped() {
        let json = r#"{ "min_players": 0, "max_players": 20, "default_players": 1 }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!((config.min_players, config.max_players), (2, 8));
        assert_eq!(config.default_players, 2);

        let json = r#"{ "min_players": 6, "max_players": 3 }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!((config.min_players, config.max_players), (6, 6));
    }

    #[test]
    fn degenerate_values_are_fixed() {
        let json = r#"{ "turn_duration": 0, "player_colors": [] }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.turn_duration, 1);
        assert_eq!(config.player_colors.len(), 8);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(GameConfig::from_json("{ turn_duration: }").is_err());
        assert!(GameConfig::from_file("does/not/exist.json").is_err());
    }

    #[test]
    fn category_paths() {
        let config = GameConfig::default();
        assert_eq!(config.category_path("animals"), "categories/animals.category");
    }
}
