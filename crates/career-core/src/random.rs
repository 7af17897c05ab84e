//! Randomization and seeding primitives. Everything takes an explicit `Rng`
//! so callers control determinism.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub fn clamp<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Clamp a stat into the 0..=100 band.
pub fn clamp_stat(value: i64) -> i32 {
    clamp(value, 0, 100) as i32
}

pub fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if !(probability > 0.0) {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rng.gen::<f64>() < probability
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weighted<T> {
    pub item: T,
    pub weight: f64,
}

impl<T> Weighted<T> {
    pub fn new(item: T, weight: f64) -> Self {
        Self { item, weight }
    }
}

/// Single-pass weighted pick. Non-positive weights never win; `None` only when
/// nothing carries positive weight.
pub fn sample_weighted<'a, T, R>(rng: &mut R, items: &'a [Weighted<T>]) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    let total: f64 = items
        .iter()
        .filter(|entry| entry.weight > 0.0)
        .map(|entry| entry.weight)
        .sum();
    if !(total > 0.0) {
        return None;
    }

    let mut threshold = rng.gen::<f64>() * total;
    let mut last_positive = None;
    for entry in items.iter().filter(|entry| entry.weight > 0.0) {
        threshold -= entry.weight;
        if threshold <= 0.0 {
            return Some(&entry.item);
        }
        last_positive = Some(&entry.item);
    }

    // Rounding can leave a sliver above zero after the final subtraction.
    last_positive
}

/// Bounded geometric gap: count up from `min` while Bernoulli trials fail,
/// never past `max`.
pub fn sample_geometric_gap<R: Rng + ?Sized>(
    rng: &mut R,
    probability: f64,
    min: u32,
    max: u32,
) -> u32 {
    let probability = clamp(probability, 0.05, 0.95);
    let max = max.max(min);
    let mut gap = min;
    while gap < max && !roll(rng, probability) {
        gap += 1;
    }
    gap
}

pub fn mix_seed(seed: u64, salt: u64) -> u64 {
    let mut value = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    value ^= value.rotate_left(29);
    value = value.wrapping_mul(0x517C_C1B7_2722_0A95);
    value ^ (value >> 31)
}

/// Per-request stream: the same profile seed and nonce always replay the same draws.
pub fn action_rng(seed: u64, nonce: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix_seed(seed, nonce))
}

pub fn random_token<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_weight_items_never_win() {
        let items = vec![Weighted::new("A", 0.0), Weighted::new("B", 10.0)];
        for seed in 0..500 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(sample_weighted(&mut rng, &items), Some(&"B"));
        }
    }

    #[test]
    fn empty_or_non_positive_pool_returns_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let empty: Vec<Weighted<u8>> = Vec::new();
        assert_eq!(sample_weighted(&mut rng, &empty), None);

        let negative = vec![Weighted::new(1_u8, -3.0), Weighted::new(2_u8, 0.0)];
        assert_eq!(sample_weighted(&mut rng, &negative), None);
    }

    #[test]
    fn weighted_pick_follows_weights_roughly() {
        let items = vec![Weighted::new(0_usize, 1.0), Weighted::new(1_usize, 3.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut hits = [0_u32; 2];
        for _ in 0..4_000 {
            let pick = sample_weighted(&mut rng, &items).copied().expect("pick");
            hits[pick] += 1;
        }
        assert!(hits[1] > hits[0] * 2, "heavier item should dominate: {hits:?}");
    }

    #[test]
    fn roll_respects_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!roll(&mut rng, 0.0));
        assert!(!roll(&mut rng, f64::NAN));
        assert!(roll(&mut rng, 1.0));
    }

    #[test]
    fn action_rng_is_reproducible() {
        let mut first = action_rng(1337, 4);
        let mut second = action_rng(1337, 4);
        let a: [u64; 4] = first.gen();
        let b: [u64; 4] = second.gen();
        assert_eq!(a, b);
        assert_ne!(random_token(&mut action_rng(1337, 5)), random_token(&mut action_rng(1337, 6)));
    }

    proptest! {
        #[test]
        fn geometric_gap_stays_in_bounds(seed in any::<u64>(), p in -1.0_f64..2.0, min in 0_u32..20, span in 0_u32..30) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let gap = sample_geometric_gap(&mut rng, p, min, min + span);
            prop_assert!(gap >= min);
            prop_assert!(gap <= min + span);
        }

        #[test]
        fn clamp_stat_stays_in_band(value in any::<i32>()) {
            let clamped = clamp_stat(i64::from(value));
            prop_assert!((0..=100).contains(&clamped));
        }
    }
}
