//! Capabilities consumed from an arcade emulator core.
//!
//! The adapter treats the emulator as a black box. Every call is expected to
//! either fully succeed or fail without leaving partial state behind; errors
//! are propagated to the caller unchanged.

use crate::action::Action;
use crate::Result;
use std::path::Path;

/// Well-known configuration keys accepted by `set_int`, `set_float` and `set_bool`.
pub mod keys {
    /// Seed for the emulator's internal RNG (int).
    pub const RANDOM_SEED: &str = "random_seed";
    /// Probability of repeating the previous action instead of the new one (float).
    pub const REPEAT_ACTION_PROBABILITY: &str = "repeat_action_probability";
    /// Open a window showing the screen (bool).
    pub const DISPLAY_SCREEN: &str = "display_screen";
    /// Enable game audio (bool).
    pub const SOUND: &str = "sound";
}

/// An emulator core driving a single game cartridge.
pub trait Emulator: Send {
    /// Load a ROM and reset the machine. Called on every reseed.
    fn load_rom(&mut self, path: &Path) -> Result<()>;

    /// Restart the loaded game without reloading the ROM.
    fn reset_game(&mut self) -> Result<()>;

    /// Emulate one frame with `action` held and return the reward it produced.
    fn act(&mut self, action: Action) -> Result<f32>;

    fn game_over(&self) -> bool;

    fn lives(&self) -> i32;

    /// Every action the cabinet accepts, in identifier order.
    fn legal_action_set(&self) -> Vec<Action>;

    /// The actions that matter for the loaded game.
    fn minimal_action_set(&self) -> Vec<Action>;

    fn ram_size(&self) -> usize;

    /// Copy RAM into `out`, which must be exactly `ram_size()` bytes.
    fn get_ram(&self, out: &mut [u8]) -> Result<()>;

    /// Screen size as `(height, width)`.
    fn screen_dims(&self) -> (usize, usize);

    /// Write the screen as packed RGB into `out` (`height * width * 3` bytes).
    fn get_screen_rgb(&self, out: &mut [u8]) -> Result<()>;

    /// Write the screen as luminance into `out` (`height * width` bytes).
    fn get_screen_grayscale(&self, out: &mut [u8]) -> Result<()>;

    fn set_int(&mut self, key: &str, value: i32) -> Result<()>;

    fn set_float(&mut self, key: &str, value: f32) -> Result<()>;

    fn set_bool(&mut self, key: &str, value: bool) -> Result<()>;

    fn set_mode(&mut self, mode: u32) -> Result<()>;

    fn set_difficulty(&mut self, difficulty: u32) -> Result<()>;

    /// Identify the game a ROM file belongs to, as a snake_case id.
    fn is_supported_rom(&self, path: &Path) -> Option<String>;
}
