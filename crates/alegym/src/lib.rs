//! # alegym
//!
//! An episodic reinforcement learning interface over cycle-stepped arcade
//! emulators.
//!
//! ## Overview
//!
//! alegym provides:
//! - The `Emulator` trait describing the capabilities consumed from a native core
//! - `AleEnv`, the adapter that seeds, steps, frame-skips and observes an emulator
//! - A ROM registry and the table of named environment variants
//! - Episode statistics and time-limit wrappers
//! - Vectorized execution (serial and parallel), one adapter per slot
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alegym::prelude::*;
//! use alegym_emulators::ToyArcade;
//!
//! let mut roms = RomRegistry::new();
//! roms.insert("Catch", "/path/to/catch.bin");
//!
//! let config = EnvConfig::new("Catch").with_obs_type(ObsType::Ram);
//! let mut env = AleEnv::new(ToyArcade::new(), config, &roms)?;
//! env.seed(Some(42))?;
//! env.reset()?;
//!
//! let result = env.step(0)?;
//! println!("reward={} lives={}", result.reward, result.info.lives);
//! ```

pub mod action;
pub mod config;
pub mod emulator;
pub mod env;
pub mod frameskip;
pub mod observation;
pub mod registration;
pub mod roms;
pub mod seeding;
pub mod spaces;
pub mod vector;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionSet};
    pub use crate::config::{EnvConfig, RenderMode};
    pub use crate::emulator::Emulator;
    pub use crate::env::{AleEnv, EpisodeStats, Environment, StepInfo, StepResult, TimeLimit};
    pub use crate::frameskip::Frameskip;
    pub use crate::observation::{ObsType, ObservationBuffer};
    pub use crate::registration::{make, variants, EnvSpec};
    pub use crate::roms::RomRegistry;
    pub use crate::seeding::SeedPair;
    pub use crate::spaces::*;
    pub use crate::vector::{Parallel, Serial, VecEnv, VecEnvBackend, VecEnvConfig, VecEnvResult};
    pub use crate::{AleError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum AleError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unable to find {0}, did you register its ROM?")]
    InvalidGame(String),

    #[error("Invalid action index {index}, expected a value in [0, {len})")]
    InvalidActionIndex { index: usize, len: usize },

    #[error("Invalid state: cannot {op} while {state}")]
    InvalidState {
        op: &'static str,
        state: &'static str,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Emulator error: {0}")]
    Emulator(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, AleError>;
