//! Environment wrappers for common functionality.

use super::{Environment, StepResult};
use crate::seeding::SeedPair;
use crate::spaces::DynSpace;
use crate::Result;
use ndarray::ArrayViewD;

/// Wrapper that tracks episode statistics (return and length).
///
/// Adds `episode_return` and `episode_length` to info on episode completion.
pub struct EpisodeStats<E: Environment> {
    env: E,
    episode_return: f32,
    episode_length: u32,
}

impl<E: Environment> EpisodeStats<E> {
    /// Wrap an environment with episode statistics tracking
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode_return: 0.0,
            episode_length: 0,
        }
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Get a mutable reference to the inner environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Environment> Environment for EpisodeStats<E> {
    fn observation_space(&self) -> DynSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.env.action_space()
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<SeedPair> {
        self.episode_return = 0.0;
        self.episode_length = 0;
        self.env.seed(seed)
    }

    fn reset(&mut self) -> Result<ArrayViewD<'_, u8>> {
        self.episode_return = 0.0;
        self.episode_length = 0;
        self.env.reset()
    }

    fn step(&mut self, action: usize) -> Result<StepResult<'_>> {
        let mut result = self.env.step(action)?;

        self.episode_return += result.reward;
        self.episode_length += 1;

        if result.done() {
            result.info = std::mem::take(&mut result.info)
                .with_episode_stats(self.episode_return, self.episode_length);

            // The caller resets the env; counters start over here.
            self.episode_return = 0.0;
            self.episode_length = 0;
        }

        Ok(result)
    }

    fn observation(&self) -> ArrayViewD<'_, u8> {
        self.env.observation()
    }

    fn render(&self) -> Result<()> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.env.is_done()
    }
}

/// Wrapper that truncates episodes after a fixed number of steps.
pub struct TimeLimit<E: Environment> {
    env: E,
    max_episode_steps: u32,
    elapsed: u32,
}

impl<E: Environment> TimeLimit<E> {
    pub fn new(env: E, max_episode_steps: u32) -> Self {
        Self {
            env,
            max_episode_steps,
            elapsed: 0,
        }
    }

    pub fn max_episode_steps(&self) -> u32 {
        self.max_episode_steps
    }

    /// Steps taken since the last reset
    pub fn elapsed_steps(&self) -> u32 {
        self.elapsed
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    fn observation_space(&self) -> DynSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.env.action_space()
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<SeedPair> {
        self.elapsed = 0;
        self.env.seed(seed)
    }

    fn reset(&mut self) -> Result<ArrayViewD<'_, u8>> {
        self.elapsed = 0;
        self.env.reset()
    }

    fn step(&mut self, action: usize) -> Result<StepResult<'_>> {
        let mut result = self.env.step(action)?;
        self.elapsed += 1;
        if self.elapsed >= self.max_episode_steps {
            result.truncated = true;
        }
        Ok(result)
    }

    fn observation(&self) -> ArrayViewD<'_, u8> {
        self.env.observation()
    }

    fn render(&self) -> Result<()> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.env.is_done() || self.elapsed >= self.max_episode_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StepInfo;
    use crate::spaces::{Box as BoxSpace, Discrete};
    use ndarray::{ArrayD, IxDyn};

    // Simple test environment
    struct SimpleEnv {
        step_count: u32,
        obs: ArrayD<u8>,
    }

    impl SimpleEnv {
        fn new() -> Self {
            Self {
                step_count: 0,
                obs: ArrayD::zeros(IxDyn(&[2])),
            }
        }
    }

    impl Environment for SimpleEnv {
        fn observation_space(&self) -> DynSpace {
            DynSpace::Box(BoxSpace::bytes(&[2]))
        }

        fn action_space(&self) -> DynSpace {
            DynSpace::Discrete(Discrete::new(2))
        }

        fn seed(&mut self, seed: Option<u64>) -> Result<SeedPair> {
            Ok(SeedPair {
                host: seed.unwrap_or(0),
                emulator: 0,
            })
        }

        fn reset(&mut self) -> Result<ArrayViewD<'_, u8>> {
            self.step_count = 0;
            self.obs.fill(0);
            Ok(self.obs.view())
        }

        fn step(&mut self, _action: usize) -> Result<StepResult<'_>> {
            self.step_count += 1;
            self.obs.fill(self.step_count as u8);
            Ok(StepResult {
                observation: self.obs.view(),
                reward: 1.0,
                terminal: self.step_count >= 5,
                truncated: false,
                info: StepInfo::new(1),
            })
        }

        fn observation(&self) -> ArrayViewD<'_, u8> {
            self.obs.view()
        }

        fn is_done(&self) -> bool {
            self.step_count >= 5
        }
    }

    #[test]
    fn test_episode_stats() {
        let mut wrapped = EpisodeStats::new(SimpleEnv::new());

        wrapped.reset().unwrap();

        for _ in 0..4 {
            let result = wrapped.step(0).unwrap();
            assert!(!result.done());
            assert!(result.info.get("episode_return").is_none());
        }

        // 5th step should terminate
        let result = wrapped.step(0).unwrap();
        assert!(result.done());
        assert_eq!(result.info.get("episode_return"), Some(5.0));
        assert_eq!(result.info.get("episode_length"), Some(5.0));
        assert_eq!(result.info.lives, 1);
    }

    #[test]
    fn test_time_limit_truncates() {
        let mut wrapped = TimeLimit::new(SimpleEnv::new(), 3);
        wrapped.reset().unwrap();

        assert!(!wrapped.step(0).unwrap().truncated);
        assert!(!wrapped.step(0).unwrap().truncated);
        let result = wrapped.step(0).unwrap();
        assert!(result.truncated);
        assert!(!result.terminal);
        assert!(result.done());
        assert!(wrapped.is_done());
        assert_eq!(wrapped.elapsed_steps(), 3);

        wrapped.reset().unwrap();
        assert_eq!(wrapped.elapsed_steps(), 0);
        assert!(!wrapped.is_done());
    }

    #[test]
    fn test_stats_over_time_limit() {
        let mut wrapped = EpisodeStats::new(TimeLimit::new(SimpleEnv::new(), 2));
        wrapped.reset().unwrap();
        wrapped.step(0).unwrap();
        let result = wrapped.step(0).unwrap();
        assert!(result.truncated);
        assert_eq!(result.info.episode_length, Some(2));
        assert_eq!(result.observation[[0]], 2);
        assert_eq!(wrapped.inner().max_episode_steps(), 2);
    }
}
