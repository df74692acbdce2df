//! Environment traits, the emulator adapter and wrappers.
//!
//! `AleEnv` turns an `Emulator` into an `Environment`; wrappers add episode
//! statistics and time limits on top of any `Environment`.

mod ale;
mod traits;
mod wrappers;

pub use ale::{AleEnv, Phase};
pub use traits::{Environment, StepInfo, StepResult};
pub use wrappers::{EpisodeStats, TimeLimit};
