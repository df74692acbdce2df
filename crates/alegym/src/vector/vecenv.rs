//! Vectorized environment abstraction.

use crate::env::{Environment, StepInfo};
use crate::seeding::SeedPair;
use crate::spaces::{DynSpace, Space};
use crate::{AleError, Result};
use ndarray::{Array2, ArrayViewD, ArrayViewMut1};

/// Configuration for vectorized environments
#[derive(Clone, Debug)]
pub struct VecEnvConfig {
    /// Number of environments
    pub num_envs: usize,
    /// Base seed; slot `i` is seeded with `seed + i`
    pub seed: Option<u64>,
}

impl Default for VecEnvConfig {
    fn default() -> Self {
        Self {
            num_envs: 1,
            seed: None,
        }
    }
}

impl VecEnvConfig {
    /// Create a new config with specified number of environments
    pub fn new(num_envs: usize) -> Self {
        Self {
            num_envs,
            ..Default::default()
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Result from stepping all environments
#[derive(Clone, Debug)]
pub struct VecEnvResult {
    /// Flattened observations, one row per environment
    pub observations: Array2<u8>,
    /// Rewards for all environments
    pub rewards: Vec<f32>,
    /// Terminal flags
    pub terminals: Vec<bool>,
    /// Truncated flags
    pub truncated: Vec<bool>,
    /// Per-environment info
    pub infos: Vec<StepInfo>,
}

impl VecEnvResult {
    /// Check which environments are done
    pub fn dones(&self) -> Vec<bool> {
        self.terminals
            .iter()
            .zip(self.truncated.iter())
            .map(|(&t, &tr)| t || tr)
            .collect()
    }
}

/// Trait for vectorized environment backends
pub trait VecEnvBackend: Send {
    /// Get the observation space (single env)
    fn observation_space(&self) -> DynSpace;

    /// Get the action space (single env)
    fn action_space(&self) -> DynSpace;

    /// Get the number of environments
    fn num_envs(&self) -> usize;

    /// Seed every environment; with a base seed `s`, slot `i` gets `s + i`
    fn seed(&mut self, seed: Option<u64>) -> Result<Vec<SeedPair>>;

    /// Reset all environments
    fn reset(&mut self) -> Result<Array2<u8>>;

    /// Step all environments with one action index each.
    ///
    /// Environments that finished on the previous call are reset instead of
    /// stepped, reporting zero reward for that slot.
    fn step(&mut self, actions: &[usize]) -> Result<VecEnvResult>;

    /// Close all environments
    fn close(&mut self);
}

/// Per-slot outcome of a vectorized step
pub(crate) struct SlotOutcome {
    pub reward: f32,
    pub terminal: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

pub(crate) fn slot_seed(seed: Option<u64>, index: usize) -> Option<u64> {
    seed.map(|s| s.wrapping_add(index as u64))
}

/// Reject a batch before any slot is stepped.
pub(crate) fn check_actions(
    actions: &[usize],
    num_envs: usize,
    action_space: &DynSpace,
) -> Result<()> {
    if actions.len() != num_envs {
        return Err(AleError::ShapeMismatch {
            expected: vec![num_envs],
            actual: vec![actions.len()],
        });
    }
    if let Some(space) = action_space.as_discrete() {
        if let Some(&index) = actions.iter().find(|&&a| !space.contains(&a)) {
            return Err(AleError::InvalidActionIndex {
                index,
                len: space.n,
            });
        }
    }
    Ok(())
}

pub(crate) fn check_num_envs(num_envs: usize) -> Result<()> {
    if num_envs == 0 {
        return Err(AleError::Config(
            "number of environments must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn copy_into(mut row: ArrayViewMut1<'_, u8>, obs: ArrayViewD<'_, u8>) -> Result<()> {
    if row.len() != obs.len() {
        return Err(AleError::ShapeMismatch {
            expected: vec![row.len()],
            actual: obs.shape().to_vec(),
        });
    }
    for (dst, &src) in row.iter_mut().zip(obs.iter()) {
        *dst = src;
    }
    Ok(())
}

pub(crate) fn reset_slot<E: Environment>(env: &mut E, row: ArrayViewMut1<'_, u8>) -> Result<()> {
    let obs = env.reset()?;
    copy_into(row, obs)
}

pub(crate) fn step_slot<E: Environment>(
    env: &mut E,
    action: usize,
    row: ArrayViewMut1<'_, u8>,
) -> Result<SlotOutcome> {
    if env.is_done() {
        reset_slot(env, row)?;
        return Ok(SlotOutcome {
            reward: 0.0,
            terminal: false,
            truncated: false,
            info: StepInfo::default(),
        });
    }

    let result = env.step(action)?;
    let outcome = SlotOutcome {
        reward: result.reward,
        terminal: result.terminal,
        truncated: result.truncated,
        info: result.info,
    };
    copy_into(row, result.observation)?;
    Ok(outcome)
}

pub(crate) fn collect(observations: Array2<u8>, outcomes: Vec<SlotOutcome>) -> VecEnvResult {
    let mut rewards = Vec::with_capacity(outcomes.len());
    let mut terminals = Vec::with_capacity(outcomes.len());
    let mut truncated = Vec::with_capacity(outcomes.len());
    let mut infos = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        rewards.push(outcome.reward);
        terminals.push(outcome.terminal);
        truncated.push(outcome.truncated);
        infos.push(outcome.info);
    }
    VecEnvResult {
        observations,
        rewards,
        terminals,
        truncated,
        infos,
    }
}

/// Main vectorized environment struct
pub struct VecEnv<B: VecEnvBackend> {
    backend: B,
}

impl<B: VecEnvBackend> VecEnv<B> {
    /// Create from a backend
    pub fn from_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get observation space
    pub fn observation_space(&self) -> DynSpace {
        self.backend.observation_space()
    }

    /// Get action space
    pub fn action_space(&self) -> DynSpace {
        self.backend.action_space()
    }

    /// Get number of environments
    pub fn num_envs(&self) -> usize {
        self.backend.num_envs()
    }

    pub fn seed(&mut self, seed: Option<u64>) -> Result<Vec<SeedPair>> {
        self.backend.seed(seed)
    }

    /// Reset all environments
    pub fn reset(&mut self) -> Result<Array2<u8>> {
        self.backend.reset()
    }

    /// Step all environments
    pub fn step(&mut self, actions: &[usize]) -> Result<VecEnvResult> {
        self.backend.step(actions)
    }

    /// Close all environments
    pub fn close(&mut self) {
        self.backend.close()
    }
}

impl<B: VecEnvBackend> VecEnvBackend for VecEnv<B> {
    fn observation_space(&self) -> DynSpace {
        self.backend.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.backend.action_space()
    }

    fn num_envs(&self) -> usize {
        self.backend.num_envs()
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<Vec<SeedPair>> {
        self.backend.seed(seed)
    }

    fn reset(&mut self) -> Result<Array2<u8>> {
        self.backend.reset()
    }

    fn step(&mut self, actions: &[usize]) -> Result<VecEnvResult> {
        self.backend.step(actions)
    }

    fn close(&mut self) {
        self.backend.close()
    }
}
