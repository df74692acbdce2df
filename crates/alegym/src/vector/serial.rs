//! Serial (sequential) vectorization backend.
//!
//! Runs environments one at a time in a single thread.
//! Useful for debugging and small-scale experiments.

use super::vecenv::{
    check_actions, check_num_envs, collect, reset_slot, slot_seed, step_slot, VecEnvBackend,
    VecEnvResult,
};
use crate::env::Environment;
use crate::seeding::SeedPair;
use crate::spaces::DynSpace;
use crate::Result;
use ndarray::Array2;

/// Serial vectorization backend
pub struct Serial<E: Environment> {
    /// Created environments
    envs: Vec<E>,
    /// Flattened observation size
    obs_size: usize,
}

impl<E: Environment> Serial<E> {
    /// Create `num_envs` environments with `env_creator`
    pub fn new<F>(mut env_creator: F, num_envs: usize) -> Result<Self>
    where
        F: FnMut() -> Result<E>,
    {
        check_num_envs(num_envs)?;
        let envs = (0..num_envs)
            .map(|_| env_creator())
            .collect::<Result<Vec<_>>>()?;
        let obs_size = envs[0].observation_space().shape().iter().product();

        Ok(Self { envs, obs_size })
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }
}

impl<E: Environment> VecEnvBackend for Serial<E> {
    fn observation_space(&self) -> DynSpace {
        self.envs[0].observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.envs[0].action_space()
    }

    fn num_envs(&self) -> usize {
        self.envs.len()
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<Vec<SeedPair>> {
        self.envs
            .iter_mut()
            .enumerate()
            .map(|(i, env)| env.seed(slot_seed(seed, i)))
            .collect()
    }

    fn reset(&mut self) -> Result<Array2<u8>> {
        let mut observations = Array2::zeros((self.envs.len(), self.obs_size));
        for (env, row) in self.envs.iter_mut().zip(observations.outer_iter_mut()) {
            reset_slot(env, row)?;
        }
        Ok(observations)
    }

    fn step(&mut self, actions: &[usize]) -> Result<VecEnvResult> {
        check_actions(actions, self.envs.len(), &self.envs[0].action_space())?;
        let mut observations = Array2::zeros((self.envs.len(), self.obs_size));

        let mut outcomes = Vec::with_capacity(self.envs.len());
        for ((env, &action), row) in self
            .envs
            .iter_mut()
            .zip(actions)
            .zip(observations.outer_iter_mut())
        {
            outcomes.push(step_slot(env, action, row)?);
        }

        Ok(collect(observations, outcomes))
    }

    fn close(&mut self) {
        for env in &mut self.envs {
            env.close();
        }
    }
}
