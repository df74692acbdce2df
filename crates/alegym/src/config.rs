//! Environment configuration.
//!
//! Defaults follow Machado et al., 2018 ("Revisiting the Arcade Learning
//! Environment"): sticky actions with probability 0.25 and the full action
//! space.

use crate::frameskip::Frameskip;
use crate::observation::ObsType;
use crate::{AleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the environment presents itself to a human, chosen at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Display the screen and play sound, locked to the ROM's frame rate
    Human,
    /// Attach a fresh RGB frame under `rgb` to every step's info
    RgbArray,
}

impl FromStr for RenderMode {
    type Err = AleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(RenderMode::Human),
            "rgb_array" => Ok(RenderMode::RgbArray),
            other => Err(AleError::Config(format!(
                "render mode {} not supported (rgb_array, human)",
                other
            ))),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Human => f.write_str("human"),
            RenderMode::RgbArray => f.write_str("rgb_array"),
        }
    }
}

/// Configuration for a single environment instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Game identifier, looked up in the ROM registry
    pub game: String,
    /// Game mode, applied after every ROM load
    pub mode: Option<u32>,
    /// Game difficulty, applied after every ROM load
    pub difficulty: Option<u32>,
    /// Observation kind
    pub obs_type: ObsType,
    /// Frames each action is repeated for
    pub frameskip: Frameskip,
    /// Emulator-side probability of repeating the previous action
    pub repeat_action_probability: f32,
    /// Use all 18 actions instead of the game's minimal set
    pub full_action_space: bool,
    /// Optional render mode
    pub render_mode: Option<RenderMode>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            game: "Pong".to_string(),
            mode: None,
            difficulty: None,
            obs_type: ObsType::Rgb,
            frameskip: Frameskip::default(),
            repeat_action_probability: 0.25,
            full_action_space: true,
            render_mode: None,
        }
    }
}

impl EnvConfig {
    /// Default configuration for `game`
    pub fn new(game: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_obs_type(mut self, obs_type: ObsType) -> Self {
        self.obs_type = obs_type;
        self
    }

    pub fn with_frameskip(mut self, frameskip: Frameskip) -> Self {
        self.frameskip = frameskip;
        self
    }

    pub fn with_repeat_action_probability(mut self, probability: f32) -> Self {
        self.repeat_action_probability = probability;
        self
    }

    pub fn with_full_action_space(mut self, full: bool) -> Self {
        self.full_action_space = full;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = Some(render_mode);
        self
    }

    /// Check every value-level constraint. Called by the environment before it
    /// touches the emulator.
    pub fn validate(&self) -> Result<()> {
        if self.game.is_empty() {
            return Err(AleError::Config("game must not be empty".to_string()));
        }
        self.frameskip.validate()?;
        if !(0.0..=1.0).contains(&self.repeat_action_probability) {
            return Err(AleError::Config(format!(
                "repeat_action_probability must be in [0, 1], got {}",
                self.repeat_action_probability
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EnvConfig::default();
        assert_eq!(config.game, "Pong");
        assert_eq!(config.obs_type, ObsType::Rgb);
        assert_eq!(config.frameskip, Frameskip::Fixed(5));
        assert_eq!(config.repeat_action_probability, 0.25);
        assert!(config.full_action_space);
        assert!(config.render_mode.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EnvConfig::new("Breakout")
            .with_mode(2)
            .with_difficulty(1)
            .with_obs_type(ObsType::Grayscale)
            .with_frameskip(Frameskip::Range(2, 5))
            .with_repeat_action_probability(0.0)
            .with_full_action_space(false)
            .with_render_mode(RenderMode::RgbArray);
        assert_eq!(config.game, "Breakout");
        assert_eq!(config.mode, Some(2));
        assert_eq!(config.difficulty, Some(1));
        assert_eq!(config.render_mode, Some(RenderMode::RgbArray));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(EnvConfig::new("").validate().is_err());
        assert!(EnvConfig::new("Pong")
            .with_frameskip(Frameskip::Fixed(0))
            .validate()
            .is_err());
        assert!(EnvConfig::new("Pong")
            .with_repeat_action_probability(1.5)
            .validate()
            .is_err());
        assert!(EnvConfig::new("Pong")
            .with_repeat_action_probability(-0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_json_roundtrip_and_partial() {
        let config = EnvConfig::from_json_str(
            r#"{"game": "Tennis", "obs_type": "ram", "frameskip": [2, 5], "render_mode": "rgb_array"}"#,
        )
        .unwrap();
        assert_eq!(config.game, "Tennis");
        assert_eq!(config.obs_type, ObsType::Ram);
        assert_eq!(config.frameskip, Frameskip::Range(2, 5));
        assert_eq!(config.render_mode, Some(RenderMode::RgbArray));
        assert_eq!(config.repeat_action_probability, 0.25);

        let json = config.to_json().unwrap();
        assert_eq!(EnvConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_json_rejects_closed_enums() {
        assert!(EnvConfig::from_json_str(r#"{"obs_type": "depth"}"#).is_err());
        assert!(EnvConfig::from_json_str(r#"{"render_mode": "ansi"}"#).is_err());
        assert!(EnvConfig::from_json_str(r#"{"frameskip": [5, 2]}"#).is_err());
        assert!(EnvConfig::from_json_str(r#"{"frameskip": [1, 2, 3]}"#).is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("env.json");
        std::fs::write(&path, r#"{"game": "Pong", "frameskip": 4}"#).unwrap();
        let config = EnvConfig::from_path(&path).unwrap();
        assert_eq!(config.frameskip, Frameskip::Fixed(4));

        assert!(matches!(
            EnvConfig::from_path(dir.path().join("missing.json")),
            Err(AleError::Io(_))
        ));
    }

    #[test]
    fn test_parse_render_mode() {
        assert_eq!("human".parse::<RenderMode>().unwrap(), RenderMode::Human);
        assert_eq!(
            "rgb_array".parse::<RenderMode>().unwrap(),
            RenderMode::RgbArray
        );
        assert!("rgb".parse::<RenderMode>().is_err());
    }
}
