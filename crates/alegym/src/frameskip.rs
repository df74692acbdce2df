//! Frameskip policy: how many emulator frames one agent action is held for.

use crate::{AleError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed repeat count, or a uniform draw from `[low, high)` every step.
///
/// Serialized as a bare integer or as a `[low, high]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frameskip {
    Fixed(u32),
    Range(u32, u32),
}

impl Default for Frameskip {
    fn default() -> Self {
        Frameskip::Fixed(5)
    }
}

impl Frameskip {
    /// Reject counts that would never advance the emulator and empty ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Frameskip::Fixed(0) => Err(AleError::Config(
                "frameskip must be a positive integer".to_string(),
            )),
            Frameskip::Range(low, high) if low == 0 || low >= high => Err(AleError::Config(
                format!("invalid frameskip range {}: expected 1 <= low < high", self),
            )),
            _ => Ok(()),
        }
    }

    /// Repeat count for the next step.
    ///
    /// Range draws come from the adapter's RNG, never the emulator's.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            Frameskip::Fixed(n) => n,
            Frameskip::Range(low, high) => rng.gen_range(low..high),
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self, Frameskip::Range(..))
    }
}

impl fmt::Display for Frameskip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frameskip::Fixed(n) => write!(f, "{}", n),
            Frameskip::Range(low, high) => write!(f, "[{}, {})", low, high),
        }
    }
}
