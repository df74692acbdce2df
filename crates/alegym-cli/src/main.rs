//! alegym CLI
//!
//! Command-line runner for arcade environments, backed by the ToyArcade
//! reference emulator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use alegym::prelude::*;
use alegym::registration::{all_variants, MAX_EPISODE_STEPS};
use alegym_emulators::{write_rom, ToyArcade, CARTRIDGES};

#[derive(Parser)]
#[command(name = "alegym")]
#[command(version, about = "alegym - Arcade environments for reinforcement learning", long_about = None)]
struct Cli {
    /// Directory the ToyArcade ROMs are installed into
    #[arg(long, global = true)]
    rom_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available environment ids
    List,

    /// Evaluate a random policy
    Eval {
        /// Environment id
        env: String,

        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: usize,

        /// Base seed; environment `i` is seeded with `seed + i`
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of environments, stepped in parallel when above 1
        #[arg(long, default_value = "1")]
        num_envs: usize,
    },

    /// Demo: step an environment and print every transition
    Demo {
        /// Environment id
        #[arg(default_value = "Catch-ram-v4")]
        env: String,

        /// Number of steps
        #[arg(long, default_value = "100")]
        steps: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// JSON environment config, used instead of the id
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let roms = install_roms(cli.rom_dir)?;

    match cli.command {
        Commands::List => {
            list_envs(&roms);
        }
        Commands::Eval {
            env,
            episodes,
            seed,
            num_envs,
        } => {
            eval(&env, episodes, seed, num_envs, &roms)?;
        }
        Commands::Demo {
            env,
            steps,
            seed,
            config,
        } => {
            demo(&env, config.as_deref(), steps, seed, &roms)?;
        }
    }

    Ok(())
}

/// Write every ToyArcade cartridge into `dir` and register it.
fn install_roms(dir: Option<PathBuf>) -> Result<RomRegistry> {
    let dir = dir.unwrap_or_else(|| std::env::temp_dir().join("alegym-roms"));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating ROM directory {}", dir.display()))?;

    let probe = ToyArcade::new();
    let mut roms = RomRegistry::new();
    for cartridge in CARTRIDGES.iter() {
        let path = write_rom(&dir, cartridge.rom_id)
            .with_context(|| format!("writing ROM {}", cartridge.rom_id))?;
        roms.register(&path, &probe)?;
    }

    tracing::debug!(dir = %dir.display(), games = roms.len(), "Installed ROMs");
    Ok(roms)
}

fn list_envs(roms: &RomRegistry) {
    println!("Available environments:");
    println!();
    for spec in all_variants(roms) {
        println!(
            "  {:<28} obs={:<4} frameskip={:<7} sticky={}",
            spec.id,
            spec.config.obs_type.as_str(),
            spec.config.frameskip.to_string(),
            spec.config.repeat_action_probability
        );
    }
}

fn eval(id: &str, episodes: usize, seed: u64, num_envs: usize, roms: &RomRegistry) -> Result<()> {
    tracing::info!(
        env = id,
        episodes,
        seed,
        num_envs,
        "Starting evaluation (random policy)"
    );

    let config = VecEnvConfig::new(num_envs).with_seed(seed);
    let create = || make(id, ToyArcade::new(), roms).map(EpisodeStats::new);
    let returns = if config.num_envs > 1 {
        collect_returns(
            VecEnv::from_backend(Parallel::new(create, config.num_envs)?),
            episodes,
            &config,
        )?
    } else {
        collect_returns(
            VecEnv::from_backend(Serial::new(create, config.num_envs)?),
            episodes,
            &config,
        )?
    };

    let mean_return = returns.iter().sum::<f32>() / returns.len().max(1) as f32;
    tracing::info!(mean_return, episodes = returns.len(), "Evaluation complete");
    println!(
        "mean return over {} episodes: {:.2}",
        returns.len(),
        mean_return
    );
    Ok(())
}

fn collect_returns<B: VecEnvBackend>(
    mut envs: VecEnv<B>,
    episodes: usize,
    config: &VecEnvConfig,
) -> Result<Vec<f32>> {
    let action_space = envs.action_space();
    let actions = action_space
        .as_discrete()
        .context("expected a discrete action space")?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    envs.seed(config.seed)?;
    envs.reset()?;

    let mut returns = Vec::with_capacity(episodes);
    while returns.len() < episodes {
        let batch: Vec<usize> = (0..envs.num_envs())
            .map(|_| actions.sample(&mut rng))
            .collect();
        let result = envs.step(&batch)?;

        for (slot, info) in result.infos.iter().enumerate() {
            if let Some(episode_return) = info.episode_return {
                tracing::info!(
                    episode = returns.len(),
                    slot,
                    episode_return,
                    length = info.episode_length,
                    "Episode finished"
                );
                returns.push(episode_return);
            }
        }
    }
    returns.truncate(episodes);

    envs.close();
    Ok(returns)
}

fn demo(
    id: &str,
    config: Option<&Path>,
    steps: usize,
    seed: u64,
    roms: &RomRegistry,
) -> Result<()> {
    let mut env = match config {
        Some(path) => {
            let config = EnvConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            TimeLimit::new(
                AleEnv::new(ToyArcade::new(), config, roms)?,
                MAX_EPISODE_STEPS,
            )
        }
        None => make(id, ToyArcade::new(), roms)?,
    };
    tracing::info!(game = %env.inner().config().game, steps, "Running demo");

    let seeds = env.seed(Some(seed))?;
    tracing::info!(
        host_seed = seeds.host,
        emulator_seed = seeds.emulator,
        "Seeded"
    );
    env.reset()?;

    let actions = env.inner().action_set().clone();
    let space = actions.space();
    let mut rng = StdRng::seed_from_u64(seed);
    for step in 0..steps {
        let index = space.sample(&mut rng);
        let result = env.step(index)?;
        println!(
            "Step {}: action={}, reward={}, lives={}",
            step,
            actions.get(index)?,
            result.reward,
            result.info.lives
        );

        if result.done() {
            tracing::info!(step, "Episode ended, resetting");
            env.reset()?;
        }
    }

    Ok(())
}
