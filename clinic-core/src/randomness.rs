//! Seeded randomness for deterministic trials.
//!
//! Every trial owns one [`SimRng`]; all draws in the trial go through it in
//! the order the processes run, so a seed fully determines the trial.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator used by every stochastic draw in a trial
pub type SimRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}
