//! Random number generator abstraction for the solver.
//!
//! The solver only ever talks to the `WfcRng` trait, so the generator behind
//! a solve can be swapped:
//!
//! - `Xoshiro128`: splitmix64 seed expansion feeding xoshiro128**. This is the
//!   default and gives the same sequence for the same `u64` seed everywhere.
//! - `StdRandom`: wraps `rand::rngs::StdRng` for callers that just want a good
//!   generator and don't care about reproducing sequences across builds.
//!
//! # Example
//!
//! ```
//! use wfc_core::rng::{WfcRng, Xoshiro128};
//!
//! let mut rng = Xoshiro128::from_u64_seed(42);
//! let value = rng.next_int(); // full u32 range
//! let float = rng.next_double(); // 0.0..1.0
//! assert!((0.0..1.0).contains(&float));
//! # let _ = value;
//! ```

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Trait for random number generators consumed by the solver.
///
/// Implementors only need `next_int`; the float and bounded helpers are
/// derived from it unless the generator has a better native source.
pub trait WfcRng {
    /// Returns a uniformly distributed `u32`.
    fn next_int(&mut self) -> u32;

    /// Returns a double uniformly distributed in [0.0, 1.0).
    ///
    /// Combines the high 27 and 26 bits of two consecutive draws into a
    /// 53-bit mantissa so the weak low-order bits are never used.
    fn next_double(&mut self) -> f64 {
        let a = (self.next_int() >> 5) as f64;
        let b = (self.next_int() >> 6) as f64;
        (a * 67_108_864.0 + b) * (1.0 / 9_007_199_254_740_992.0)
    }

    /// Returns a random usize in [0, max). Returns 0 when `max` is 0.
    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_double() * max as f64) as usize).min(max - 1)
    }

    /// Returns a random u64 built from two draws.
    fn next_u64(&mut self) -> u64 {
        let hi = self.next_int() as u64;
        let lo = self.next_int() as u64;
        (hi << 32) | lo
    }
}

/// Non-zero state used whenever seeding would otherwise leave xoshiro at all zeros.
const FALLBACK_STATE: [u32; 4] = [0x9E37_79B9, 0x243F_6A88, 0xB7E1_5162, 0x85A3_08D3];

/// One step of splitmix64: advances `state` and returns the scrambled output.
pub fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// xoshiro128** generator seeded through splitmix64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoshiro128 {
    state: [u32; 4],
}

impl Xoshiro128 {
    /// Expand a single `u64` seed into the full 128-bit state.
    pub fn from_u64_seed(seed: u64) -> Self {
        let mut sm = seed;
        let a = splitmix64(&mut sm);
        let b = splitmix64(&mut sm);
        Self::from_state([a as u32, (a >> 32) as u32, b as u32, (b >> 32) as u32])
    }

    /// Build from a raw state, substituting the fallback for all zeros.
    pub fn from_state(state: [u32; 4]) -> Self {
        if state == [0; 4] {
            Self {
                state: FALLBACK_STATE,
            }
        } else {
            Self { state }
        }
    }

    /// Current internal state, mainly useful for tests.
    pub fn state(&self) -> [u32; 4] {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let s = &mut self.state;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 9;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(11);

        result
    }
}

impl WfcRng for Xoshiro128 {
    fn next_int(&mut self) -> u32 {
        self.step()
    }
}

// Lets the generator plug into `rand` distributions and helpers.
impl RngCore for Xoshiro128 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        WfcRng::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xoshiro128 {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut state = [0u32; 4];
        for (word, bytes) in state.iter_mut().zip(seed.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        Self::from_state(state)
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::from_u64_seed(state)
    }
}

/// Standard Rust RNG wrapper using `rand::rngs::StdRng`.
///
/// Fast and high quality, but the sequence is tied to the `rand` version, so
/// it is not suitable when outputs must match across builds.
#[derive(Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_u64_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WfcRng for StdRandom {
    fn next_int(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }
}
