//! Observation and action space types.
//!
//! Gymnasium-compatible descriptions of what an environment accepts and emits.

mod r#box;
mod discrete;

pub use discrete::Discrete;
pub use r#box::{Box, DType};

use rand::Rng;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}

/// Enum for dynamic space types
#[derive(Clone, Debug, PartialEq)]
pub enum DynSpace {
    Discrete(Discrete),
    Box(Box),
}

impl DynSpace {
    /// Get the shape of this space
    pub fn shape(&self) -> Vec<usize> {
        match self {
            DynSpace::Discrete(s) => s.shape().to_vec(),
            DynSpace::Box(s) => s.shape().to_vec(),
        }
    }

    /// Element type of samples
    pub fn dtype(&self) -> DType {
        match self {
            DynSpace::Discrete(_) => DType::I64,
            DynSpace::Box(s) => s.dtype(),
        }
    }

    /// Number of discrete choices, if this is a discrete space
    pub fn n(&self) -> Option<usize> {
        match self {
            DynSpace::Discrete(s) => Some(s.n),
            DynSpace::Box(_) => None,
        }
    }

    /// The discrete space, if this is one
    pub fn as_discrete(&self) -> Option<&Discrete> {
        match self {
            DynSpace::Discrete(s) => Some(s),
            DynSpace::Box(_) => None,
        }
    }
}
