//! Entity identity and seed derivation
//!
//! Ids are handed out by a [`Registry`] owned by a single trial, so two
//! trials never observe each other's counters and a replay with the same seed
//! produces the same ids.

use serde::{Deserialize, Serialize};
use std::fmt;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministically derive the seed of one trial from the experiment seed.
///
/// Neighbouring trial indices map to unrelated seeds, which keeps the
/// repetitions statistically independent while staying reproducible.
pub fn derive_seed(base_seed: u64, trial: u64) -> u64 {
    splitmix64(base_seed ^ splitmix64(trial.wrapping_add(SEED_DOMAIN_TRIAL)))
}

const SEED_DOMAIN_TRIAL: u64 = 0x5452_4941_4C5F_5345; // "TRIAL_SE" (tag)

/// Identifier of a client, unique within one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client #{}", self.0)
    }
}

/// Identifier of a server, unique within one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerId(pub u64);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Server #{}", self.0)
    }
}

/// Per-trial id counters, one per entity kind.
///
/// Both counters start at 1 and only ever grow.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    clients: u64,
    servers: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_client(&mut self) -> ClientId {
        self.clients += 1;
        ClientId(self.clients)
    }

    pub fn next_server(&mut self) -> ServerId {
        self.servers += 1;
        ServerId(self.servers)
    }

    /// Number of clients created so far
    pub fn clients_created(&self) -> u64 {
        self.clients
    }

    pub fn servers_created(&self) -> u64 {
        self.servers
    }
}
