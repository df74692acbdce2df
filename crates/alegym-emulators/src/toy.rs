//! ToyArcade: a tiny deterministic arcade.
//!
//! Each cartridge is a one-screen paddle game. An object falls from the top
//! of the screen at a column drawn from the machine's RNG; the paddle at the
//! bottom either has to catch it or dodge it. Missing a catch (or failing to
//! dodge) costs a life, the game ends at zero lives.
//!
//! The machine RNG is reseeded from `random_seed` on every ROM load and also
//! drives sticky actions, so a given seed and action sequence always replays
//! the same frames.

use alegym::action::Action;
use alegym::emulator::{keys, Emulator};
use alegym::{AleError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

pub const SCREEN_HEIGHT: usize = 210;
pub const SCREEN_WIDTH: usize = 160;
pub const RAM_SIZE: usize = 128;

const ROM_MAGIC: &[u8] = b"TOYARCADE\x01";
const ROM_PAYLOAD_LEN: usize = 256;

const PADDLE_Y: i32 = 190;
const PADDLE_HEIGHT: i32 = 4;
const PADDLE_SPEED: i32 = 4;
const OBJECT_SIZE: i32 = 4;

const BACKGROUND: [u8; 3] = [0, 0, 0];
const PADDLE_COLOR: [u8; 3] = [200, 72, 72];
const OBJECT_COLOR: [u8; 3] = [236, 236, 236];

/// Errors raised by the ToyArcade machine.
#[derive(Debug, thiserror::Error)]
pub enum ToyError {
    #[error("no ROM loaded")]
    NoRom,

    #[error("{0} is not a ToyArcade ROM")]
    NotARom(String),

    #[error("unknown cartridge: {0}")]
    UnknownCartridge(String),

    #[error("mode {mode} not available, expected one of {available:?}")]
    UnsupportedMode {
        mode: u32,
        available: &'static [u32],
    },

    #[error("difficulty {difficulty} not available, expected one of {available:?}")]
    UnsupportedDifficulty {
        difficulty: u32,
        available: &'static [u32],
    },

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("{key} out of range: {value}")]
    InvalidSetting { key: String, value: String },

    #[error("buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

impl From<ToyError> for AleError {
    fn from(err: ToyError) -> Self {
        AleError::Emulator(err.to_string())
    }
}

/// What the paddle has to do with the falling object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// +1 for every catch, a life lost for every miss
    Catch,
    /// +1 for every object dodged, a life lost for every hit
    Dodge,
}

/// Game data stored on a ROM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cartridge {
    /// snake_case identifier written into the ROM header
    pub rom_id: &'static str,
    pub rule: Rule,
    pub lives: i32,
    /// Mode `m` makes objects fall `2 + m` pixels per frame
    pub modes: &'static [u32],
    /// Difficulty `d` halves the paddle width `d` times
    pub difficulties: &'static [u32],
    pub paddle_width: i32,
    pub minimal_actions: &'static [Action],
}

/// Every cartridge the machine can run.
pub static CARTRIDGES: [Cartridge; 2] = [
    Cartridge {
        rom_id: "catch",
        rule: Rule::Catch,
        lives: 3,
        modes: &[0, 1],
        difficulties: &[0, 1],
        paddle_width: 16,
        minimal_actions: &[Action::Noop, Action::Fire, Action::Right, Action::Left],
    },
    Cartridge {
        rom_id: "falling_rocks",
        rule: Rule::Dodge,
        lives: 5,
        modes: &[0, 1, 2],
        difficulties: &[0, 1],
        paddle_width: 24,
        minimal_actions: &[Action::Noop, Action::Right, Action::Left],
    },
];

impl Cartridge {
    pub fn find(rom_id: &str) -> Option<&'static Cartridge> {
        CARTRIDGES.iter().find(|c| c.rom_id == rom_id)
    }

    /// Read the cartridge named in a ROM header.
    fn parse(bytes: &[u8], path: &Path) -> std::result::Result<&'static Cartridge, ToyError> {
        let not_a_rom = || ToyError::NotARom(path.display().to_string());
        let rest = bytes.strip_prefix(ROM_MAGIC).ok_or_else(not_a_rom)?;
        let end = rest.iter().position(|&b| b == b'\n').ok_or_else(not_a_rom)?;
        let rom_id = std::str::from_utf8(&rest[..end]).map_err(|_| not_a_rom())?;
        Self::find(rom_id).ok_or_else(|| ToyError::UnknownCartridge(rom_id.to_string()))
    }
}

/// Write a ROM for `rom_id` into `dir` and return its path (`<dir>/<rom_id>.bin`).
pub fn write_rom(dir: &Path, rom_id: &str) -> Result<PathBuf> {
    let cartridge =
        Cartridge::find(rom_id).ok_or_else(|| ToyError::UnknownCartridge(rom_id.to_string()))?;

    let mut bytes = Vec::with_capacity(ROM_MAGIC.len() + rom_id.len() + 1 + ROM_PAYLOAD_LEN);
    bytes.extend_from_slice(ROM_MAGIC);
    bytes.extend_from_slice(cartridge.rom_id.as_bytes());
    bytes.push(b'\n');
    bytes.extend((0..ROM_PAYLOAD_LEN).map(|i| (i as u8) ^ 0x5a));

    let path = dir.join(format!("{}.bin", cartridge.rom_id));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Software arcade machine implementing `Emulator`.
pub struct ToyArcade {
    cartridge: Option<&'static Cartridge>,
    rng: ChaCha8Rng,
    random_seed: i32,
    repeat_action_probability: f32,
    display_screen: bool,
    sound: bool,
    mode: u32,
    difficulty: u32,
    last_action: Action,
    paddle_x: i32,
    object_x: i32,
    object_y: i32,
    lives: i32,
    score: i32,
    frame: u32,
}

impl Default for ToyArcade {
    fn default() -> Self {
        Self::new()
    }
}

impl ToyArcade {
    /// Create a machine with no ROM loaded
    pub fn new() -> Self {
        Self {
            cartridge: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            random_seed: 0,
            repeat_action_probability: 0.25,
            display_screen: false,
            sound: false,
            mode: 0,
            difficulty: 0,
            last_action: Action::Noop,
            paddle_x: 0,
            object_x: 0,
            object_y: 0,
            lives: 0,
            score: 0,
            frame: 0,
        }
    }

    pub fn cartridge(&self) -> Option<&'static Cartridge> {
        self.cartridge
    }

    pub fn random_seed(&self) -> i32 {
        self.random_seed
    }

    pub fn repeat_action_probability(&self) -> f32 {
        self.repeat_action_probability
    }

    pub fn display_screen(&self) -> bool {
        self.display_screen
    }

    pub fn sound(&self) -> bool {
        self.sound
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Frames emulated since the last reset
    pub fn frame_number(&self) -> u32 {
        self.frame
    }

    fn loaded(&self) -> std::result::Result<&'static Cartridge, ToyError> {
        self.cartridge.ok_or(ToyError::NoRom)
    }

    fn paddle_width(&self, cartridge: &Cartridge) -> i32 {
        (cartridge.paddle_width >> self.difficulty).max(OBJECT_SIZE)
    }

    fn fall_speed(&self) -> i32 {
        2 + self.mode as i32
    }

    fn restart(&mut self, cartridge: &Cartridge) {
        self.lives = cartridge.lives;
        self.score = 0;
        self.frame = 0;
        self.last_action = Action::Noop;
        self.paddle_x = (SCREEN_WIDTH as i32 - self.paddle_width(cartridge)) / 2;
        self.spawn_object();
    }

    fn spawn_object(&mut self) {
        self.object_x = self.rng.gen_range(0..SCREEN_WIDTH as i32 - OBJECT_SIZE);
        self.object_y = 0;
    }

    fn pixel(&self, y: i32, x: i32) -> [u8; 3] {
        let Some(cartridge) = self.cartridge else {
            return BACKGROUND;
        };
        let in_object = (self.object_y..self.object_y + OBJECT_SIZE).contains(&y)
            && (self.object_x..self.object_x + OBJECT_SIZE).contains(&x);
        if in_object {
            return OBJECT_COLOR;
        }
        let in_paddle = (PADDLE_Y..PADDLE_Y + PADDLE_HEIGHT).contains(&y)
            && (self.paddle_x..self.paddle_x + self.paddle_width(cartridge)).contains(&x);
        if in_paddle {
            PADDLE_COLOR
        } else {
            BACKGROUND
        }
    }

    fn check_len(out: &[u8], expected: usize) -> std::result::Result<(), ToyError> {
        if out.len() != expected {
            return Err(ToyError::BufferSize {
                expected,
                actual: out.len(),
            });
        }
        Ok(())
    }
}

fn luminance([r, g, b]: [u8; 3]) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

impl Emulator for ToyArcade {
    fn load_rom(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let cartridge = Cartridge::parse(&bytes, path)?;

        self.cartridge = Some(cartridge);
        self.rng = ChaCha8Rng::seed_from_u64(self.random_seed as u64);
        self.mode = 0;
        self.difficulty = 0;
        self.restart(cartridge);

        tracing::debug!(
            rom = cartridge.rom_id,
            random_seed = self.random_seed,
            "Loaded ROM"
        );
        Ok(())
    }

    fn reset_game(&mut self) -> Result<()> {
        let cartridge = self.loaded()?;
        self.restart(cartridge);
        Ok(())
    }

    fn act(&mut self, action: Action) -> Result<f32> {
        let cartridge = self.loaded()?;
        if self.game_over() {
            return Ok(0.0);
        }

        // Sticky actions: keep the previous input with the configured probability.
        if self.rng.gen::<f32>() >= self.repeat_action_probability {
            self.last_action = action;
        }
        let action = self.last_action;

        let width = self.paddle_width(cartridge);
        let boost = if action.fire() { 2 } else { 1 };
        self.paddle_x = (self.paddle_x + action.dx() * PADDLE_SPEED * boost)
            .clamp(0, SCREEN_WIDTH as i32 - width);

        self.object_y += self.fall_speed();
        self.frame += 1;

        if self.object_y + OBJECT_SIZE < PADDLE_Y {
            return Ok(0.0);
        }

        let overlaps =
            self.object_x + OBJECT_SIZE > self.paddle_x && self.object_x < self.paddle_x + width;
        let point = match cartridge.rule {
            Rule::Catch => overlaps,
            Rule::Dodge => !overlaps,
        };
        let reward = if point {
            self.score += 1;
            1.0
        } else {
            self.lives -= 1;
            0.0
        };
        self.spawn_object();
        Ok(reward)
    }

    fn game_over(&self) -> bool {
        self.cartridge.is_some() && self.lives <= 0
    }

    fn lives(&self) -> i32 {
        self.lives
    }

    fn legal_action_set(&self) -> Vec<Action> {
        Action::ALL.to_vec()
    }

    fn minimal_action_set(&self) -> Vec<Action> {
        match self.cartridge {
            Some(cartridge) => cartridge.minimal_actions.to_vec(),
            None => vec![Action::Noop],
        }
    }

    fn ram_size(&self) -> usize {
        RAM_SIZE
    }

    fn get_ram(&self, out: &mut [u8]) -> Result<()> {
        Self::check_len(out, RAM_SIZE)?;
        out.fill(0);
        out[0] = self.paddle_x as u8;
        out[1] = self.object_x as u8;
        out[2] = self.object_y.clamp(0, u8::MAX as i32) as u8;
        out[3] = self.lives.clamp(0, u8::MAX as i32) as u8;
        out[4] = self.score as u8;
        out[5] = self.frame as u8;
        out[6] = self.mode as u8;
        out[7] = self.difficulty as u8;
        Ok(())
    }

    fn screen_dims(&self) -> (usize, usize) {
        (SCREEN_HEIGHT, SCREEN_WIDTH)
    }

    fn get_screen_rgb(&self, out: &mut [u8]) -> Result<()> {
        Self::check_len(out, SCREEN_HEIGHT * SCREEN_WIDTH * 3)?;
        for (i, px) in out.chunks_exact_mut(3).enumerate() {
            let (y, x) = (i / SCREEN_WIDTH, i % SCREEN_WIDTH);
            px.copy_from_slice(&self.pixel(y as i32, x as i32));
        }
        Ok(())
    }

    fn get_screen_grayscale(&self, out: &mut [u8]) -> Result<()> {
        Self::check_len(out, SCREEN_HEIGHT * SCREEN_WIDTH)?;
        for (i, px) in out.iter_mut().enumerate() {
            let (y, x) = (i / SCREEN_WIDTH, i % SCREEN_WIDTH);
            *px = luminance(self.pixel(y as i32, x as i32));
        }
        Ok(())
    }

    fn set_int(&mut self, key: &str, value: i32) -> Result<()> {
        match key {
            keys::RANDOM_SEED => {
                self.random_seed = value;
                Ok(())
            }
            other => Err(ToyError::UnknownSetting(other.to_string()).into()),
        }
    }

    fn set_float(&mut self, key: &str, value: f32) -> Result<()> {
        match key {
            keys::REPEAT_ACTION_PROBABILITY if (0.0..=1.0).contains(&value) => {
                self.repeat_action_probability = value;
                Ok(())
            }
            keys::REPEAT_ACTION_PROBABILITY => Err(ToyError::InvalidSetting {
                key: key.to_string(),
                value: value.to_string(),
            }
            .into()),
            other => Err(ToyError::UnknownSetting(other.to_string()).into()),
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<()> {
        match key {
            keys::DISPLAY_SCREEN => self.display_screen = value,
            keys::SOUND => self.sound = value,
            other => return Err(ToyError::UnknownSetting(other.to_string()).into()),
        }
        Ok(())
    }

    fn set_mode(&mut self, mode: u32) -> Result<()> {
        let cartridge = self.loaded()?;
        if !cartridge.modes.contains(&mode) {
            return Err(ToyError::UnsupportedMode {
                mode,
                available: cartridge.modes,
            }
            .into());
        }
        self.mode = mode;
        self.restart(cartridge);
        Ok(())
    }

    fn set_difficulty(&mut self, difficulty: u32) -> Result<()> {
        let cartridge = self.loaded()?;
        if !cartridge.difficulties.contains(&difficulty) {
            return Err(ToyError::UnsupportedDifficulty {
                difficulty,
                available: cartridge.difficulties,
            }
            .into());
        }
        self.difficulty = difficulty;
        self.restart(cartridge);
        Ok(())
    }

    fn is_supported_rom(&self, path: &Path) -> Option<String> {
        let bytes = std::fs::read(path).ok()?;
        Cartridge::parse(&bytes, path)
            .ok()
            .map(|cartridge| cartridge.rom_id.to_string())
    }
}
