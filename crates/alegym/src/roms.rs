//! Explicit mapping from game identifiers to ROM files.

use crate::emulator::Emulator;
use crate::{AleError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Game identifier → ROM path, passed to every environment at construction.
#[derive(Clone, Debug, Default)]
pub struct RomRegistry {
    roms: BTreeMap<String, PathBuf>,
}

impl RomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` under `game`, replacing any previous entry.
    pub fn insert(&mut self, game: impl Into<String>, path: impl Into<PathBuf>) {
        self.roms.insert(game.into(), path.into());
    }

    /// Ask `emulator` which game `path` holds and register it under the
    /// CamelCase name (`space_invaders` → `SpaceInvaders`).
    pub fn register<E: Emulator + ?Sized>(&mut self, path: &Path, emulator: &E) -> Result<String> {
        let rom_id = emulator.is_supported_rom(path).ok_or_else(|| {
            AleError::Config(format!(
                "ROM {} is not supported by the emulator",
                path.display()
            ))
        })?;
        let game = game_name(&rom_id);
        tracing::debug!(rom = %path.display(), game = %game, "Registered ROM");
        self.insert(game.clone(), path);
        Ok(game)
    }

    /// ROM path for `game`, or `InvalidGame`.
    pub fn get(&self, game: &str) -> Result<&Path> {
        self.roms
            .get(game)
            .map(PathBuf::as_path)
            .ok_or_else(|| AleError::InvalidGame(game.to_string()))
    }

    pub fn contains(&self, game: &str) -> bool {
        self.roms.contains_key(game)
    }

    /// Registered games in sorted order.
    pub fn games(&self) -> impl Iterator<Item = &str> {
        self.roms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roms.is_empty()
    }
}

/// Convert an emulator ROM id to its game name: title-case every word, then
/// drop underscores.
pub fn game_name(rom_id: &str) -> String {
    let mut name = String::with_capacity(rom_id.len());
    let mut prev_alpha = false;
    for c in rom_id.chars() {
        if c == '_' {
            prev_alpha = false;
            continue;
        }
        if c.is_alphabetic() {
            if prev_alpha {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            name.push(c);
            prev_alpha = false;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_name() {
        assert_eq!(game_name("pong"), "Pong");
        assert_eq!(game_name("space_invaders"), "SpaceInvaders");
        assert_eq!(game_name("journey_escape"), "JourneyEscape");
        assert_eq!(game_name("pitfall2"), "Pitfall2");
        assert_eq!(game_name("video_checkers"), "VideoCheckers");
    }

    #[test]
    fn test_lookup() {
        let mut roms = RomRegistry::new();
        assert!(roms.is_empty());
        roms.insert("Pong", "/roms/pong.bin");
        roms.insert("Breakout", "/roms/breakout.bin");

        assert_eq!(roms.get("Pong").unwrap(), Path::new("/roms/pong.bin"));
        assert!(roms.contains("Breakout"));
        assert_eq!(roms.games().collect::<Vec<_>>(), vec!["Breakout", "Pong"]);
        match roms.get("Tetris") {
            Err(AleError::InvalidGame(game)) => assert_eq!(game, "Tetris"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
