//! Adapter exposing an arcade `Emulator` as an episodic `Environment`.

use super::{Environment, StepInfo, StepResult};
use crate::action::ActionSet;
use crate::config::{EnvConfig, RenderMode};
use crate::emulator::{keys, Emulator};
use crate::observation::{render_rgb, ObservationBuffer};
use crate::roms::RomRegistry;
use crate::seeding::{self, HostRng, SeedPair};
use crate::spaces::DynSpace;
use crate::{AleError, Result};
use ndarray::ArrayViewD;
use std::path::{Path, PathBuf};

/// Where an environment is in its seed/reset/step lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// ROM freshly (re)loaded by `seed`; needs a reset before stepping
    Ready,
    /// An episode is in progress
    Playing,
    /// The last step reported a terminal state
    EpisodeEnded,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::Ready => "waiting for reset after seeding",
            Phase::Playing => "playing",
            Phase::EpisodeEnded => "the episode has ended",
        }
    }
}

/// Arcade emulator environment.
///
/// Construction validates the configuration and the game, seeds from OS
/// entropy (which loads the ROM), then fixes the action set and allocates the
/// observation buffer. Both stay fixed for the lifetime of the instance.
pub struct AleEnv<E: Emulator> {
    emulator: E,
    config: EnvConfig,
    rom_path: PathBuf,
    action_set: ActionSet,
    obs: ObservationBuffer,
    rng: HostRng,
    seeds: SeedPair,
    phase: Phase,
}

impl<E: Emulator> AleEnv<E> {
    /// Create an environment seeded from OS entropy
    pub fn new(emulator: E, config: EnvConfig, roms: &RomRegistry) -> Result<Self> {
        Self::with_seed(emulator, config, roms, None)
    }

    /// Create an environment with an explicit initial seed
    pub fn with_seed(
        mut emulator: E,
        config: EnvConfig,
        roms: &RomRegistry,
        seed: Option<u64>,
    ) -> Result<Self> {
        // Everything that can be rejected is checked before the emulator is touched.
        config.validate()?;
        let rom_path = roms.get(&config.game)?.to_path_buf();

        emulator.set_float(
            keys::REPEAT_ACTION_PROBABILITY,
            config.repeat_action_probability,
        )?;
        if config.render_mode == Some(RenderMode::Human) {
            emulator.set_bool(keys::DISPLAY_SCREEN, true)?;
            emulator.set_bool(keys::SOUND, true)?;
        }

        let (rng, seeds) = load_game(&mut emulator, &config, &rom_path, seed)?;
        let action_set = ActionSet::from_emulator(&emulator, config.full_action_space)?;
        let obs = ObservationBuffer::allocate(config.obs_type, &emulator);

        tracing::info!(
            game = %config.game,
            obs_type = %config.obs_type,
            frameskip = %config.frameskip,
            num_actions = action_set.len(),
            "Created environment"
        );

        Ok(Self {
            emulator,
            config,
            rom_path,
            action_set,
            obs,
            rng,
            seeds,
            phase: Phase::Ready,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn action_set(&self) -> &ActionSet {
        &self.action_set
    }

    /// Seeds applied by the most recent `seed` call
    pub fn seeds(&self) -> SeedPair {
        self.seeds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rom_path(&self) -> &Path {
        &self.rom_path
    }

    pub fn emulator(&self) -> &E {
        &self.emulator
    }

    pub fn lives(&self) -> i32 {
        self.emulator.lives()
    }

    pub fn game_over(&self) -> bool {
        self.emulator.game_over()
    }

    /// Buffer address, stable across every step and reset
    pub fn observation_ptr(&self) -> *const u8 {
        self.obs.as_ptr()
    }

    /// Give back the emulator, dropping the adapter state
    pub fn into_emulator(self) -> E {
        self.emulator
    }
}

/// Seed the emulator and load the game, in the order the emulator expects:
/// RNG seed, ROM, then mode and difficulty.
fn load_game<E: Emulator>(
    emulator: &mut E,
    config: &EnvConfig,
    rom_path: &Path,
    seed: Option<u64>,
) -> Result<(HostRng, SeedPair)> {
    let (rng, seeds) = seeding::derive(seed);

    // Masked to 31 bits, so the cast is lossless.
    emulator.set_int(keys::RANDOM_SEED, seeds.emulator as i32)?;
    emulator.load_rom(rom_path)?;
    if let Some(mode) = config.mode {
        emulator.set_mode(mode)?;
    }
    if let Some(difficulty) = config.difficulty {
        emulator.set_difficulty(difficulty)?;
    }

    tracing::debug!(
        game = %config.game,
        host_seed = seeds.host,
        emulator_seed = seeds.emulator,
        "Seeded environment"
    );
    Ok((rng, seeds))
}

impl<E: Emulator> Environment for AleEnv<E> {
    fn observation_space(&self) -> DynSpace {
        DynSpace::Box(self.config.obs_type.space(&self.emulator))
    }

    fn action_space(&self) -> DynSpace {
        DynSpace::Discrete(self.action_set.space())
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<SeedPair> {
        // The ROM may already be reloaded when a later setting fails.
        self.phase = Phase::Ready;
        let (rng, seeds) = load_game(&mut self.emulator, &self.config, &self.rom_path, seed)?;
        self.rng = rng;
        self.seeds = seeds;
        Ok(seeds)
    }

    fn reset(&mut self) -> Result<ArrayViewD<'_, u8>> {
        self.emulator.reset_game()?;
        self.obs.fill(&self.emulator)?;
        self.phase = Phase::Playing;
        tracing::debug!(game = %self.config.game, lives = self.emulator.lives(), "Reset");
        Ok(self.obs.view())
    }

    fn step(&mut self, action: usize) -> Result<StepResult<'_>> {
        let action = self.action_set.get(action)?;
        if self.phase != Phase::Playing {
            return Err(AleError::InvalidState {
                op: "step",
                state: self.phase.describe(),
            });
        }

        // Terminal and lives describe the state before acting, so a game over
        // caused by this step is reported by the next one.
        let terminal = self.emulator.game_over();
        let mut info = StepInfo::new(self.emulator.lives());

        let frameskip = self.config.frameskip.resolve(&mut self.rng);
        let mut reward = 0.0f32;
        for _ in 0..frameskip {
            reward += self.emulator.act(action)?;
        }

        self.obs.fill(&self.emulator)?;

        // Rendered separately from the observation, even when it is RGB already.
        if self.config.render_mode == Some(RenderMode::RgbArray) {
            info.rgb = Some(render_rgb(&self.emulator)?);
        }

        if terminal {
            self.phase = Phase::EpisodeEnded;
        }

        tracing::trace!(%action, frameskip, reward, terminal, "Step");

        Ok(StepResult {
            observation: self.obs.view(),
            reward,
            terminal,
            truncated: false,
            info,
        })
    }

    fn observation(&self) -> ArrayViewD<'_, u8> {
        self.obs.view()
    }

    fn is_done(&self) -> bool {
        self.phase == Phase::EpisodeEnded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::frameskip::Frameskip;
    use crate::observation::ObsType;

    /// Emulator whose reward cycles through `rewards` and which ends the game
    /// after `game_length` frames.
    struct Countdown {
        rewards: Vec<f32>,
        game_length: u32,
        frames: u32,
        loads: u32,
        last_seed: i32,
        mode_fails_from_load: Option<u32>,
    }

    impl Countdown {
        fn new(rewards: Vec<f32>, game_length: u32) -> Self {
            Self {
                rewards,
                game_length,
                frames: 0,
                loads: 0,
                last_seed: -1,
                mode_fails_from_load: None,
            }
        }
    }

    impl Emulator for Countdown {
        fn load_rom(&mut self, _path: &Path) -> Result<()> {
            self.loads += 1;
            self.frames = 0;
            Ok(())
        }
        fn reset_game(&mut self) -> Result<()> {
            self.frames = 0;
            Ok(())
        }
        fn act(&mut self, _action: Action) -> Result<f32> {
            let reward = self.rewards[self.frames as usize % self.rewards.len()];
            self.frames += 1;
            Ok(reward)
        }
        fn game_over(&self) -> bool {
            self.frames >= self.game_length
        }
        fn lives(&self) -> i32 {
            (self.game_length - self.frames.min(self.game_length)) as i32
        }
        fn legal_action_set(&self) -> Vec<Action> {
            Action::ALL.to_vec()
        }
        fn minimal_action_set(&self) -> Vec<Action> {
            vec![Action::Noop, Action::Fire]
        }
        fn ram_size(&self) -> usize {
            2
        }
        fn get_ram(&self, out: &mut [u8]) -> Result<()> {
            out[0] = self.frames as u8;
            out[1] = self.loads as u8;
            Ok(())
        }
        fn screen_dims(&self) -> (usize, usize) {
            (1, 1)
        }
        fn get_screen_rgb(&self, out: &mut [u8]) -> Result<()> {
            out.fill(self.frames as u8);
            Ok(())
        }
        fn get_screen_grayscale(&self, out: &mut [u8]) -> Result<()> {
            out.fill(self.frames as u8);
            Ok(())
        }
        fn set_int(&mut self, key: &str, value: i32) -> Result<()> {
            if key == keys::RANDOM_SEED {
                self.last_seed = value;
            }
            Ok(())
        }
        fn set_float(&mut self, _key: &str, _value: f32) -> Result<()> {
            Ok(())
        }
        fn set_bool(&mut self, _key: &str, _value: bool) -> Result<()> {
            Ok(())
        }
        fn set_mode(&mut self, mode: u32) -> Result<()> {
            match self.mode_fails_from_load {
                Some(load) if self.loads >= load => {
                    Err(AleError::Emulator(format!("mode {} rejected", mode)))
                }
                _ => Ok(()),
            }
        }
        fn set_difficulty(&mut self, _difficulty: u32) -> Result<()> {
            Ok(())
        }
        fn is_supported_rom(&self, _path: &Path) -> Option<String> {
            Some("countdown".to_string())
        }
    }

    fn roms() -> RomRegistry {
        let mut roms = RomRegistry::new();
        roms.insert("Countdown", "countdown.bin");
        roms
    }

    fn config() -> EnvConfig {
        EnvConfig::new("Countdown")
            .with_obs_type(ObsType::Ram)
            .with_frameskip(Frameskip::Fixed(4))
    }

    #[test]
    fn test_frameskip_sums_rewards() {
        let emu = Countdown::new(vec![0.0, 0.0, 1.0, 0.0], 100);
        let mut env = AleEnv::with_seed(emu, config(), &roms(), Some(0)).unwrap();
        env.reset().unwrap();
        let result = env.step(0).unwrap();
        assert_eq!(result.reward, 1.0);
        assert_eq!(result.observation[[0]], 4);
    }

    #[test]
    fn test_terminal_is_reported_one_step_late() {
        let emu = Countdown::new(vec![1.0], 4);
        let mut env = AleEnv::with_seed(emu, config(), &roms(), Some(0)).unwrap();
        env.reset().unwrap();

        // The game ends during this step, but the flag reflects the state before it.
        let first = env.step(1).unwrap();
        assert!(!first.terminal);
        assert_eq!(first.info.lives, 4);
        assert!(env.game_over());
        assert!(!env.is_done());

        let second = env.step(1).unwrap();
        assert!(second.terminal);
        assert_eq!(second.info.lives, 0);
        assert!(env.is_done());
        assert_eq!(env.phase(), Phase::EpisodeEnded);

        assert!(matches!(
            env.step(1),
            Err(AleError::InvalidState { op: "step", .. })
        ));
        env.reset().unwrap();
        assert!(env.step(1).is_ok());
    }

    #[test]
    fn test_step_requires_reset() {
        let emu = Countdown::new(vec![0.0], 10);
        let mut env = AleEnv::with_seed(emu, config(), &roms(), Some(0)).unwrap();
        assert_eq!(env.phase(), Phase::Ready);
        assert!(matches!(env.step(0), Err(AleError::InvalidState { .. })));
    }

    #[test]
    fn test_out_of_range_action_leaves_emulator_alone() {
        let emu = Countdown::new(vec![1.0], 100);
        let mut env = AleEnv::with_seed(emu, config(), &roms(), Some(0)).unwrap();
        env.reset().unwrap();
        assert_eq!(env.action_set().len(), Action::COUNT);
        match env.step(Action::COUNT) {
            Err(AleError::InvalidActionIndex { index, len }) => {
                assert_eq!(index, 18);
                assert_eq!(len, 18);
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.reward)),
        }
        assert_eq!(env.emulator().frames, 0);
    }

    #[test]
    fn test_seed_reloads_rom() {
        let emu = Countdown::new(vec![0.0], 100);
        let mut env = AleEnv::with_seed(emu, config(), &roms(), Some(7)).unwrap();
        assert_eq!(env.emulator().loads, 1);
        assert_eq!(env.seeds().host, 7);

        let pair = env.seed(Some(42)).unwrap();
        assert_eq!(env.emulator().loads, 2);
        assert_eq!(pair.host, 42);
        assert_eq!(env.emulator().last_seed, pair.emulator as i32);
        assert_eq!(pair, seeding::derive(Some(42)).1);
    }

    #[test]
    fn test_failed_reseed_requires_reset() {
        let mut emu = Countdown::new(vec![0.0], 100);
        emu.mode_fails_from_load = Some(2);
        let mut env =
            AleEnv::with_seed(emu, config().with_mode(1), &roms(), Some(7)).unwrap();
        env.reset().unwrap();
        env.step(0).unwrap();
        assert_eq!(env.phase(), Phase::Playing);

        assert!(matches!(env.seed(Some(8)), Err(AleError::Emulator(_))));
        assert_eq!(env.emulator().loads, 2);
        assert_eq!(env.phase(), Phase::Ready);
        assert_eq!(env.seeds().host, 7);
        assert!(matches!(
            env.step(0),
            Err(AleError::InvalidState { op: "step", .. })
        ));
        env.reset().unwrap();
        assert!(env.step(0).is_ok());
    }

    #[test]
    fn test_unknown_game_rejected() {
        let emu = Countdown::new(vec![0.0], 100);
        let result = AleEnv::new(emu, EnvConfig::new("Missing"), &roms());
        assert!(matches!(result, Err(AleError::InvalidGame(_))));
    }

    #[test]
    fn test_spaces_and_render() {
        let emu = Countdown::new(vec![0.0], 100);
        let env = AleEnv::with_seed(
            emu,
            config().with_full_action_space(false),
            &roms(),
            Some(0),
        )
        .unwrap();
        assert_eq!(env.action_space().n(), Some(2));
        assert_eq!(env.observation_space().shape(), vec![2]);
        assert!(matches!(env.render(), Err(AleError::Unsupported(_))));
    }
}
