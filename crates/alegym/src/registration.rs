//! Named environment variants.
//!
//! Every registered game gets twelve ids, one per combination of observation
//! kind, frameskip policy and version:
//!
//! | id                          | obs | frameskip | sticky |
//! |-----------------------------|-----|-----------|--------|
//! | `Pong-v0`                   | rgb | [2, 5)    | 0.25   |
//! | `Pong-ramDeterministic-v4`  | ram | 4         | 0.0    |
//! | `PongNoFrameskip-v4`        | rgb | 1         | 0.0    |
//!
//! All variants use the minimal action set and a step limit of 10000.

use crate::config::EnvConfig;
use crate::emulator::Emulator;
use crate::env::{AleEnv, TimeLimit};
use crate::frameskip::Frameskip;
use crate::observation::ObsType;
use crate::roms::RomRegistry;
use crate::{AleError, Result};
use serde::{Deserialize, Serialize};

/// Step limit applied by `make` to every variant
pub const MAX_EPISODE_STEPS: u32 = 10_000;

const OBS_TYPES: [ObsType; 2] = [ObsType::Rgb, ObsType::Ram];
const VERSIONS: [(&str, f32); 2] = [("v0", 0.25), ("v4", 0.0)];

/// A named, fully specified environment configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvSpec {
    pub id: String,
    pub config: EnvConfig,
    pub max_episode_steps: u32,
}

fn frameskip_configs(game: &str) -> [(&'static str, Frameskip); 3] {
    // SpaceInvaders lasers are invisible at a frameskip of 4.
    let deterministic = if game == "SpaceInvaders" { 3 } else { 4 };
    [
        ("", Frameskip::Range(2, 5)),
        ("Deterministic", Frameskip::Fixed(deterministic)),
        ("NoFrameskip", Frameskip::Fixed(1)),
    ]
}

/// All variants of `game`
pub fn variants(game: &str) -> Vec<EnvSpec> {
    let mut specs = Vec::with_capacity(OBS_TYPES.len() * 3 * VERSIONS.len());
    for obs_type in OBS_TYPES {
        let obs_suffix = if obs_type == ObsType::Ram { "-ram" } else { "" };
        for (config_name, frameskip) in frameskip_configs(game) {
            for (version, repeat_action_probability) in VERSIONS {
                let config = EnvConfig::new(game)
                    .with_obs_type(obs_type)
                    .with_frameskip(frameskip)
                    .with_repeat_action_probability(repeat_action_probability)
                    .with_full_action_space(false);
                specs.push(EnvSpec {
                    id: format!("{}{}{}-{}", game, obs_suffix, config_name, version),
                    config,
                    max_episode_steps: MAX_EPISODE_STEPS,
                });
            }
        }
    }
    specs
}

/// Variants of every game in `roms`, in game order
pub fn all_variants(roms: &RomRegistry) -> Vec<EnvSpec> {
    roms.games().flat_map(variants).collect()
}

/// Look up the variant named `id` among the registered games.
pub fn spec(id: &str, roms: &RomRegistry) -> Result<EnvSpec> {
    roms.games()
        .filter(|game| id.starts_with(*game))
        .flat_map(variants)
        .find(|spec| spec.id == id)
        .ok_or_else(|| AleError::InvalidGame(id.to_string()))
}

/// Build the variant named `id` around `emulator`, wrapped in its step limit.
pub fn make<E: Emulator>(
    id: &str,
    emulator: E,
    roms: &RomRegistry,
) -> Result<TimeLimit<AleEnv<E>>> {
    let spec = spec(id, roms)?;
    let env = AleEnv::new(emulator, spec.config, roms)?;
    Ok(TimeLimit::new(env, spec.max_episode_steps))
}
