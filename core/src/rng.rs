//! Deterministic pseudo-randomness for display variation.
//!
//! RULE: Nothing in the scoring engine may call any platform RNG.
//! Every "random" display element is derived from the provider id
//! and the provider's position in the batch, so the same batch
//! always renders the same way.
//!
//! Two pieces live here:
//!   - `provider_seed`: a stable numeric hash of a provider id.
//!   - `ProviderRng`:   a PCG stream seeded from (seed, index).

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Maximum number of trailing digits folded into a seed.
/// 18 decimal digits always fit in a u64.
const MAX_SEED_DIGITS: usize = 18;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Numeric seed for a provider id.
///
/// Ids ending in digits (NPIs, numeric row keys) use the value of
/// their trailing digits, so "123456789" seeds as 123456789.
/// Anything else falls back to FNV-1a over the raw bytes.
pub fn provider_seed(provider_id: &str) -> u64 {
    let trimmed = provider_id.trim();
    let digits: Vec<u8> = trimmed
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .take(MAX_SEED_DIGITS)
        .collect();

    if digits.is_empty() {
        return fnv1a(trimmed.as_bytes());
    }

    digits
        .iter()
        .rev()
        .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// A deterministic RNG for a single provider row.
pub struct ProviderRng {
    inner: Pcg64Mcg,
}

impl ProviderRng {
    /// Seed a stream from the provider seed and its batch index.
    pub fn new(seed: u64, index: usize) -> Self {
        let derived_seed = seed ^ (index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a signed step in [-max_step, max_step].
    pub fn step(&mut self, max_step: u32) -> i64 {
        let span = u64::from(max_step) * 2 + 1;
        self.next_u64_below(span) as i64 - i64::from(max_step)
    }
}
