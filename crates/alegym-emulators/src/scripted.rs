//! Scripted emulator for exercising the adapter contract.

use alegym::action::Action;
use alegym::emulator::Emulator;
use alegym::{AleError, Result};
use std::path::{Path, PathBuf};

/// A mutating call received by `ScriptedEmulator`
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    LoadRom(PathBuf),
    ResetGame,
    Act(Action),
    SetInt(String, i32),
    SetFloat(String, f32),
    SetBool(String, bool),
    SetMode(u32),
    SetDifficulty(u32),
}

/// Emulator that replays a fixed script.
///
/// The n-th `act` since the last reset returns `rewards[n % rewards.len()]`,
/// or zero for an empty script.
/// The game is over once `game_length` frames have been played, and lives
/// count down by one per frame from `lives`. RAM byte 0 holds the frame count
/// and byte 1 the number of ROM loads; every screen pixel holds the frame
/// count.
#[derive(Clone, Debug)]
pub struct ScriptedEmulator {
    rewards: Vec<f32>,
    game_length: u32,
    lives: i32,
    minimal_actions: Vec<Action>,
    screen: (usize, usize),
    ram_size: usize,
    fail_after: Option<u32>,
    frame: u32,
    loads: u32,
    calls: Vec<Call>,
}

impl Default for ScriptedEmulator {
    fn default() -> Self {
        Self::new(vec![0.0])
    }
}

impl ScriptedEmulator {
    pub fn new(rewards: Vec<f32>) -> Self {
        Self {
            rewards,
            game_length: u32::MAX,
            lives: 0,
            minimal_actions: vec![Action::Noop, Action::Fire, Action::Up, Action::Down],
            screen: (4, 6),
            ram_size: 128,
            fail_after: None,
            frame: 0,
            loads: 0,
            calls: Vec::new(),
        }
    }

    /// End the game after `frames` frames
    pub fn with_game_length(mut self, frames: u32) -> Self {
        self.game_length = frames;
        self
    }

    pub fn with_lives(mut self, lives: i32) -> Self {
        self.lives = lives;
        self
    }

    pub fn with_minimal_actions(mut self, actions: Vec<Action>) -> Self {
        self.minimal_actions = actions;
        self
    }

    /// Screen size as `(height, width)`
    pub fn with_screen(mut self, height: usize, width: usize) -> Self {
        self.screen = (height, width);
        self
    }

    pub fn with_ram_size(mut self, ram_size: usize) -> Self {
        self.ram_size = ram_size;
        self
    }

    /// Fail every `act` once `frames` frames have been played
    pub fn failing_after(mut self, frames: u32) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Every mutating call so far, oldest first
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Frames played since the last reset or ROM load
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn loads(&self) -> u32 {
        self.loads
    }

    fn check_len(out: &[u8], expected: usize) -> Result<()> {
        if out.len() != expected {
            return Err(AleError::ShapeMismatch {
                expected: vec![expected],
                actual: vec![out.len()],
            });
        }
        Ok(())
    }
}

impl Emulator for ScriptedEmulator {
    fn load_rom(&mut self, path: &Path) -> Result<()> {
        self.calls.push(Call::LoadRom(path.to_path_buf()));
        self.loads += 1;
        self.frame = 0;
        Ok(())
    }

    fn reset_game(&mut self) -> Result<()> {
        self.calls.push(Call::ResetGame);
        self.frame = 0;
        Ok(())
    }

    fn act(&mut self, action: Action) -> Result<f32> {
        self.calls.push(Call::Act(action));
        if self.fail_after.is_some_and(|limit| self.frame >= limit) {
            return Err(AleError::Emulator(format!(
                "scripted failure at frame {}",
                self.frame
            )));
        }
        let reward = match self.rewards.len() {
            0 => 0.0,
            len => self.rewards[self.frame as usize % len],
        };
        self.frame += 1;
        Ok(reward)
    }

    fn game_over(&self) -> bool {
        self.frame >= self.game_length
    }

    fn lives(&self) -> i32 {
        (self.lives - self.frame as i32).max(0)
    }

    fn legal_action_set(&self) -> Vec<Action> {
        Action::ALL.to_vec()
    }

    fn minimal_action_set(&self) -> Vec<Action> {
        self.minimal_actions.clone()
    }

    fn ram_size(&self) -> usize {
        self.ram_size
    }

    fn get_ram(&self, out: &mut [u8]) -> Result<()> {
        Self::check_len(out, self.ram_size)?;
        out.fill(0);
        if let Some(b) = out.get_mut(0) {
            *b = self.frame as u8;
        }
        if let Some(b) = out.get_mut(1) {
            *b = self.loads as u8;
        }
        Ok(())
    }

    fn screen_dims(&self) -> (usize, usize) {
        self.screen
    }

    fn get_screen_rgb(&self, out: &mut [u8]) -> Result<()> {
        Self::check_len(out, self.screen.0 * self.screen.1 * 3)?;
        out.fill(self.frame as u8);
        Ok(())
    }

    fn get_screen_grayscale(&self, out: &mut [u8]) -> Result<()> {
        Self::check_len(out, self.screen.0 * self.screen.1)?;
        out.fill(self.frame as u8);
        Ok(())
    }

    fn set_int(&mut self, key: &str, value: i32) -> Result<()> {
        self.calls.push(Call::SetInt(key.to_string(), value));
        Ok(())
    }

    fn set_float(&mut self, key: &str, value: f32) -> Result<()> {
        self.calls.push(Call::SetFloat(key.to_string(), value));
        Ok(())
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.calls.push(Call::SetBool(key.to_string(), value));
        Ok(())
    }

    fn set_mode(&mut self, mode: u32) -> Result<()> {
        self.calls.push(Call::SetMode(mode));
        Ok(())
    }

    fn set_difficulty(&mut self, difficulty: u32) -> Result<()> {
        self.calls.push(Call::SetDifficulty(difficulty));
        Ok(())
    }

    fn is_supported_rom(&self, path: &Path) -> Option<String> {
        match path.extension() {
            Some(ext) if ext == "bin" => path.file_stem().map(|s| s.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_replay() {
        let mut emu = ScriptedEmulator::new(vec![0.0, 2.0])
            .with_game_length(3)
            .with_lives(2);
        assert_eq!(emu.act(Action::Fire).unwrap(), 0.0);
        assert_eq!(emu.lives(), 1);
        assert_eq!(emu.act(Action::Fire).unwrap(), 2.0);
        assert!(!emu.game_over());
        assert_eq!(emu.act(Action::Fire).unwrap(), 0.0);
        assert!(emu.game_over());
        assert_eq!(emu.lives(), 0);

        emu.reset_game().unwrap();
        assert!(!emu.game_over());
        assert_eq!(
            emu.calls(),
            &[
                Call::Act(Action::Fire),
                Call::Act(Action::Fire),
                Call::Act(Action::Fire),
                Call::ResetGame
            ]
        );
    }

    #[test]
    fn test_empty_script_pays_nothing() {
        let mut emu = ScriptedEmulator::new(Vec::new()).with_game_length(2);
        assert_eq!(emu.act(Action::Noop).unwrap(), 0.0);
        assert_eq!(emu.act(Action::Fire).unwrap(), 0.0);
        assert!(emu.game_over());
    }

    #[test]
    fn test_failure() {
        let mut emu = ScriptedEmulator::default().failing_after(1);
        assert!(emu.act(Action::Noop).is_ok());
        assert!(matches!(emu.act(Action::Noop), Err(AleError::Emulator(_))));
    }

    #[test]
    fn test_buffers() {
        let mut emu = ScriptedEmulator::default().with_screen(2, 2).with_ram_size(4);
        emu.load_rom(Path::new("pong.bin")).unwrap();
        emu.act(Action::Noop).unwrap();

        let mut ram = [9u8; 4];
        emu.get_ram(&mut ram).unwrap();
        assert_eq!(ram, [1, 1, 0, 0]);

        let mut rgb = [0u8; 12];
        emu.get_screen_rgb(&mut rgb).unwrap();
        assert!(rgb.iter().all(|&v| v == 1));
        assert!(emu.get_screen_grayscale(&mut rgb).is_err());
        assert_eq!(
            emu.is_supported_rom(Path::new("/roms/space_invaders.bin")).as_deref(),
            Some("space_invaders")
        );
        assert_eq!(emu.is_supported_rom(Path::new("/roms/readme.txt")), None);
    }
}
