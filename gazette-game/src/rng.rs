//! Deterministic seeded RNG streams shared by the daily generators.
//!
//! Every generator draws from a `ChaCha20` stream derived from the base date
//! seed plus a domain tag, so sibling games on the same calendar day stay
//! decorrelated while remaining reproducible bit-for-bit.

use hmac::{Hmac, Mac};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// Seeded stream used by puzzle generation.
pub type PuzzleStream = CountingRng<ChaCha20Rng>;

/// Derive a stream seed from a user-visible seed and a domain tag.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Construct a counting stream for the given seed and domain tag.
#[must_use]
pub fn stream(user_seed: u64, domain_tag: &[u8]) -> PuzzleStream {
    CountingRng::new(derive_stream_seed(user_seed, domain_tag))
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Uniform fraction in `[0, 1)`.
pub fn fraction(rng: &mut impl Rng) -> f64 {
    rng.r#gen::<f64>()
}

/// Uniform integer draw in the inclusive range `[min, max]`.
pub fn range_u32(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn same_seed_same_stream() {
        let mut a = stream(20_240_315, b"barter");
        let mut b = stream(20_240_315, b"barter");
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn nth_fraction_is_stable_across_instantiations() {
        let nth = |n: usize| {
            let mut rng = stream(7, b"barter");
            let mut last = 0.0;
            for _ in 0..=n {
                last = fraction(&mut rng);
            }
            last
        };
        let expected = nth(9);
        assert!((nth(9) - expected).abs() < f64::EPSILON);
        assert!((0.0..1.0).contains(&expected));
    }

    #[test]
    fn domain_tags_decorrelate_streams() {
        let mut a = stream(42, b"barter");
        let mut b = stream(42, b"sudoku");
        let same = (0..16).filter(|_| a.next_u64() == b.next_u64()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn counting_tracks_draws() {
        let mut rng = stream(1, b"barter");
        assert_eq!(rng.draws(), 0);
        let _ = rng.next_u32();
        let _ = rng.next_u64();
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn range_draw_respects_bounds() {
        let mut rng = stream(3, b"barter");
        for _ in 0..64 {
            let v = range_u32(&mut rng, 2, 5);
            assert!((2..=5).contains(&v));
        }
        assert_eq!(range_u32(&mut rng, 4, 4), 4);
    }
}
