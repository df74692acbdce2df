//! Box space over bounded integer pixels and bytes

use super::Space;
use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Element type of a box space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    U8,
    I64,
}

/// Box space of `u8` values with the same bounds for every element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Box {
    /// Lower bound (inclusive)
    pub low: u8,
    /// Upper bound (inclusive)
    pub high: u8,
    /// Shape of the space
    shape: Vec<usize>,
}

impl Box {
    /// Create a new box space with given bounds
    pub fn new(shape: &[usize], low: u8, high: u8) -> Self {
        assert!(low <= high, "Low must not exceed high");
        Self {
            low,
            high,
            shape: shape.to_vec(),
        }
    }

    /// Full byte range `[0, 255]`, used for screens and RAM
    pub fn bytes(shape: &[usize]) -> Self {
        Self::new(shape, u8::MIN, u8::MAX)
    }

    pub fn dtype(&self) -> DType {
        DType::U8
    }
}

impl Space for Box {
    type Sample = ArrayD<u8>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        ArrayD::from_shape_simple_fn(IxDyn(&self.shape), || {
            rng.gen_range(self.low..=self.high)
        })
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.shape() == self.shape.as_slice()
            && value.iter().all(|&v| v >= self.low && v <= self.high)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
