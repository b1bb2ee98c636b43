//! One RNG handle per game state, per §3/§9: everything that needs
//! randomness (the Generator's clue placement, the Guess engine's weighted
//! sampling) draws from this single stream, so a fixed seed makes an
//! entire run reproducible.

use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct Rng(StdRng);

impl Rng {
    /// Seed from the OS entropy source, for normal interactive use.
    pub fn from_entropy() -> Self {
        Rng(StdRng::from_entropy())
    }

    /// Pin the stream to a fixed seed, for deterministic tests and replays.
    pub fn from_seed(seed: u64) -> Self {
        Rng(StdRng::seed_from_u64(seed))
    }

    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.0
    }
}
