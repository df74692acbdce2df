//! Core environment trait definitions.

use crate::seeding::SeedPair;
use crate::spaces::DynSpace;
use crate::{AleError, Result};
use ndarray::{Array3, ArrayViewD};

/// Metadata returned alongside every step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Lives remaining, read before the step's actions were applied
    pub lives: i32,
    /// Fresh RGB frame, present when rendering to arrays
    pub rgb: Option<Array3<u8>>,
    /// Episode return (if done)
    pub episode_return: Option<f32>,
    /// Episode length (if done)
    pub episode_length: Option<u32>,
}

impl StepInfo {
    pub fn new(lives: i32) -> Self {
        Self {
            lives,
            ..Default::default()
        }
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f32, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len);
        self
    }

    /// Get a scalar value by key
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "lives" => Some(self.lives as f32),
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length.map(|l| l as f32),
            _ => None,
        }
    }
}

/// Result from a single environment step.
///
/// The observation borrows the environment's buffer and is overwritten by the
/// next call; copy it (`to_owned()`) to keep it.
#[derive(Debug)]
pub struct StepResult<'a> {
    /// Observation after the step
    pub observation: ArrayViewD<'a, u8>,
    /// Sum of per-frame rewards over the frameskip
    pub reward: f32,
    /// Game over, as observed before this step's actions
    pub terminal: bool,
    /// Episode cut short by a wrapper (time limit, etc.)
    pub truncated: bool,
    /// Additional info
    pub info: StepInfo,
}

impl StepResult<'_> {
    /// Check if episode is done (terminal or truncated)
    pub fn done(&self) -> bool {
        self.terminal || self.truncated
    }
}

/// Episodic interaction interface.
///
/// Every call blocks until the underlying work completes. Instances may be
/// moved across threads but never shared; run one instance per worker.
pub trait Environment: Send {
    /// Get the observation space
    fn observation_space(&self) -> DynSpace;

    /// Get the action space
    fn action_space(&self) -> DynSpace;

    /// Reseed the environment and reload its game.
    ///
    /// # Returns
    /// The host and emulator seeds that were applied
    fn seed(&mut self, seed: Option<u64>) -> Result<SeedPair>;

    /// Start a new episode and return the first observation
    fn reset(&mut self) -> Result<ArrayViewD<'_, u8>>;

    /// Take a single step with the action at `action` in the action space
    fn step(&mut self, action: usize) -> Result<StepResult<'_>>;

    /// Current contents of the observation buffer
    fn observation(&self) -> ArrayViewD<'_, u8>;

    /// Rendering is configured at construction, not requested per call
    fn render(&self) -> Result<()> {
        Err(AleError::Unsupported(
            "render() is unsupported, specify render_mode at construction".to_string(),
        ))
    }

    /// Optional: Close the environment and free resources
    fn close(&mut self) {}

    /// Check if the episode has ended and needs a reset
    fn is_done(&self) -> bool {
        false
    }
}
