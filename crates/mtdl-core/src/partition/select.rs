//! Pre-partition selection: seeded shuffle and truncation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seed used when a reproducible shuffle is requested without an explicit seed.
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// Shuffles `items` in place with a local RNG seeded from `seed`.
/// The same input and seed always produce the same order.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Applies the optional shuffle, then keeps at most `max_count` items.
/// Truncation runs after shuffling so a shuffled-then-truncated selection is reproducible.
pub fn select<T>(mut items: Vec<T>, shuffle_seed: Option<u64>, max_count: usize) -> Vec<T> {
    if let Some(seed) = shuffle_seed {
        shuffle_seeded(&mut items, seed);
    }
    items.truncate(max_count);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img/{:04}.jpg", i)).collect()
    }

    #[test]
    fn no_shuffle_keeps_order_and_truncates() {
        let out = select(names(10), None, 3);
        assert_eq!(out, vec!["img/0000.jpg", "img/0001.jpg", "img/0002.jpg"]);
    }

    #[test]
    fn max_larger_than_input_keeps_everything() {
        assert_eq!(select(names(5), None, 100).len(), 5);
    }

    #[test]
    fn max_zero_selects_nothing() {
        assert!(select(names(5), Some(DEFAULT_SHUFFLE_SEED), 0).is_empty());
    }

    #[test]
    fn shuffle_changes_order_but_not_contents() {
        let input = names(50);
        let out = select(input.clone(), Some(DEFAULT_SHUFFLE_SEED), usize::MAX);
        assert_ne!(out, input);
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(sorted, input);
    }

    #[test]
    fn different_seeds_differ() {
        let a = select(names(50), Some(1), usize::MAX);
        let b = select(names(50), Some(2), usize::MAX);
        assert_ne!(a, b);
    }

    #[test]
    fn shuffled_truncation_is_prefix_of_full_shuffle() {
        let full = select(names(40), Some(7), usize::MAX);
        let cut = select(names(40), Some(7), 10);
        assert_eq!(cut[..], full[..10]);
    }

    proptest! {
        #[test]
        fn seeded_shuffle_is_deterministic(len in 0usize..200, seed in any::<u64>()) {
            let a = select(names(len), Some(seed), usize::MAX);
            let b = select(names(len), Some(seed), usize::MAX);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn truncation_bound(len in 0usize..200, max in 0usize..250, shuffle in any::<bool>()) {
            let seed = shuffle.then_some(DEFAULT_SHUFFLE_SEED);
            let out = select(names(len), seed, max);
            prop_assert_eq!(out.len(), len.min(max));
        }
    }
}
