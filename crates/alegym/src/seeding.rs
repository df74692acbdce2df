//! Seed derivation for the adapter's own RNG and the emulator's RNG.
//!
//! A host seed (given or drawn from OS entropy) seeds the adapter RNG used for
//! stochastic frameskip. The emulator seed is derived from it by hashing
//! `host + 1` and keeping 31 bits, so equal host seeds always reproduce equal
//! emulator RNG state.

use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// RNG owned by the adapter (not the emulator).
pub type HostRng = ChaCha8Rng;

/// Emulator seeds are masked to 31 bits so they fit a non-negative `i32`.
pub const EMULATOR_SEED_MASK: u64 = (1 << 31) - 1;

/// Seeds produced by one call to `seed()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedPair {
    /// Seed of the adapter RNG
    pub host: u64,
    /// Value written to the emulator's `random_seed` setting
    pub emulator: u32,
}

/// Draw a fresh seed from the operating system.
pub fn create_seed() -> u64 {
    OsRng.next_u64()
}

/// Hash a seed so that nearby integers map to unrelated RNG streams.
///
/// SHA-512 over the decimal representation; the first 8 digest bytes are read
/// little-endian. Takes `u128` so that `u64::MAX + 1` hashes as `2^64`.
pub fn hash_seed(seed: u128) -> u64 {
    let digest = Sha512::digest(seed.to_string().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Emulator seed for a given host seed.
pub fn emulator_seed(host: u64) -> u32 {
    (hash_seed(u128::from(host) + 1) & EMULATOR_SEED_MASK) as u32
}

/// Build the host RNG and seed pair from an optional user seed.
pub fn derive(seed: Option<u64>) -> (HostRng, SeedPair) {
    let host = seed.unwrap_or_else(create_seed);
    let rng = HostRng::seed_from_u64(hash_seed(u128::from(host)));
    let pair = SeedPair {
        host,
        emulator: emulator_seed(host),
    };
    (rng, pair)
}
