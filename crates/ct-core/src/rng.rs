//! Deterministic per-household random streams.
//!
//! # Determinism strategy
//!
//! Each household owns one `SmallRng` seeded by:
//!
//!   seed = base_seed XOR (household_id * MIXING_CONSTANT)
//!
//! and every draw bumps a counter.  The stream is therefore fully described
//! by `(base_seed, household_id, count)`: any worker on any node that replays
//! the same number of draws ends up in the same state.  Pipeline checkpoints
//! store only the count; rewinding reseeds and discards `count` draws.
//!
//! Draws are always `f64` in `[0, 1)` so a replay consumes exactly the same
//! words of the generator as the original run did.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{CoreError, CoreResult, HouseholdId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── RandomStreamManager ───────────────────────────────────────────────────────

/// Hands out household streams for one model run.
///
/// Holds nothing but the base seed, so it is `Copy` and can travel with every
/// unit of work instead of living in a process-wide global.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomStreamManager {
    base_seed: u64,
}

impl RandomStreamManager {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// A fresh stream (count 0) for `household`.
    pub fn stream_for(&self, household: HouseholdId) -> RandomStream {
        RandomStream::new(self.base_seed, household)
    }
}

// ── RandomStream ──────────────────────────────────────────────────────────────

/// One household's private uniform stream plus its draw counter.
#[derive(Clone, Debug)]
pub struct RandomStream {
    rng:       SmallRng,
    household: HouseholdId,
    seed:      u64,
    count:     u64,
}

impl RandomStream {
    /// Seed deterministically from the run's base seed and a household id.
    pub fn new(base_seed: u64, household: HouseholdId) -> Self {
        let seed = base_seed ^ (household.0 as u64).wrapping_mul(MIXING_CONSTANT);
        Self {
            rng: SmallRng::seed_from_u64(seed),
            household,
            seed,
            count: 0,
        }
    }

    /// Next uniform value in `[0, 1)`.  Advances the counter by one.
    #[inline]
    pub fn draw(&mut self) -> f64 {
        self.count += 1;
        self.rng.r#gen::<f64>()
    }

    /// Number of draws taken since the stream was seeded.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn household(&self) -> HouseholdId {
        self.household
    }

    /// Put the stream back to the state it had after `n` draws.
    ///
    /// # Errors
    /// [`CoreError::RewindPastCounter`] when `n` is beyond the current count.
    pub fn rewind_to(&mut self, n: u64) -> CoreResult<()> {
        if n > self.count {
            return Err(CoreError::RewindPastCounter {
                household: self.household,
                requested: n,
                current:   self.count,
            });
        }
        self.replay(n);
        Ok(())
    }

    /// Move the stream to count `n` in either direction.
    ///
    /// Used when resuming a household loaded from a checkpoint in a new
    /// process, where the live counter starts at zero but the recorded one
    /// does not.
    pub fn restore_to(&mut self, n: u64) {
        if n >= self.count {
            for _ in self.count..n {
                let _: f64 = self.rng.r#gen();
            }
            self.count = n;
        } else {
            self.replay(n);
        }
    }

    fn replay(&mut self, n: u64) {
        self.rng = SmallRng::seed_from_u64(self.seed);
        for _ in 0..n {
            let _: f64 = self.rng.r#gen();
        }
        self.count = n;
    }
}
