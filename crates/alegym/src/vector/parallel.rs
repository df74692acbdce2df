//! Parallel vectorization backend.
//!
//! Runs environments in parallel using rayon for high throughput. Each
//! environment is owned by exactly one slot and only ever touched by the
//! worker stepping that slot.

use super::vecenv::{
    check_actions, check_num_envs, collect, reset_slot, slot_seed, step_slot, VecEnvBackend,
    VecEnvResult,
};
use crate::env::Environment;
use crate::seeding::SeedPair;
use crate::spaces::DynSpace;
use crate::Result;
use ndarray::{Array2, ArrayViewMut1};
use rayon::prelude::*;

/// Parallel vectorization backend using rayon
pub struct Parallel<E: Environment> {
    /// Environments owned by the backend
    envs: Vec<E>,
    /// Flattened observation size
    obs_size: usize,
    /// Cached observation and action spaces
    obs_space: DynSpace,
    action_space: DynSpace,
}

impl<E: Environment> Parallel<E> {
    /// Create `num_envs` environments with `env_creator`, in parallel
    pub fn new<F>(env_creator: F, num_envs: usize) -> Result<Self>
    where
        F: Fn() -> Result<E> + Send + Sync,
    {
        check_num_envs(num_envs)?;
        let envs = (0..num_envs)
            .into_par_iter()
            .map(|_| env_creator())
            .collect::<Result<Vec<_>>>()?;

        let obs_space = envs[0].observation_space();
        let action_space = envs[0].action_space();
        let obs_size = obs_space.shape().iter().product();

        tracing::debug!(num_envs, obs_size, "Created parallel backend");

        Ok(Self {
            envs,
            obs_size,
            obs_space,
            action_space,
        })
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    fn rows(observations: &mut Array2<u8>) -> Vec<ArrayViewMut1<'_, u8>> {
        observations.outer_iter_mut().collect()
    }
}

impl<E: Environment> VecEnvBackend for Parallel<E> {
    fn observation_space(&self) -> DynSpace {
        self.obs_space.clone()
    }

    fn action_space(&self) -> DynSpace {
        self.action_space.clone()
    }

    fn num_envs(&self) -> usize {
        self.envs.len()
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<Vec<SeedPair>> {
        self.envs
            .par_iter_mut()
            .enumerate()
            .map(|(i, env)| env.seed(slot_seed(seed, i)))
            .collect()
    }

    fn reset(&mut self) -> Result<Array2<u8>> {
        let mut observations = Array2::zeros((self.envs.len(), self.obs_size));
        self.envs
            .par_iter_mut()
            .zip(Self::rows(&mut observations))
            .try_for_each(|(env, row)| reset_slot(env, row))?;
        Ok(observations)
    }

    fn step(&mut self, actions: &[usize]) -> Result<VecEnvResult> {
        check_actions(actions, self.envs.len(), &self.action_space)?;
        let mut observations = Array2::zeros((self.envs.len(), self.obs_size));

        let outcomes = self
            .envs
            .par_iter_mut()
            .zip(actions.par_iter())
            .zip(Self::rows(&mut observations))
            .map(|((env, &action), row)| step_slot(env, action, row))
            .collect::<Result<Vec<_>>>()?;

        Ok(collect(observations, outcomes))
    }

    fn close(&mut self) {
        self.envs.par_iter_mut().for_each(|env| {
            env.close();
        });
    }
}
