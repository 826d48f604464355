// ============================================================
// Layer 4 — Seeded Train/Test Splitter
// ============================================================
// Shuffles samples with a fixed seed and splits them into two
// sets. The same function serves both cuts:
//   - 80/20 train/test on the full sample list
//   - 80/20 train/validation on the training side
//
// Why a fixed seed instead of thread_rng()?
//   Reproducibility: with seed 42 every run sees exactly the
//   same split, so reported RMSE/R² values are comparable
//   across runs. Both cuts reuse the same seed on purpose.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom,
// the standard unbiased shuffle algorithm.
//
// Reference: rand crate documentation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `samples` with a seeded RNG and split into
/// (train, held_out).
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
/// * `seed`           - RNG seed; equal seeds give equal splits
///
/// # Returns
/// A tuple (train_samples, held_out_samples)
pub fn split_seeded<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);

    // Fisher-Yates shuffle — every permutation is equally likely
    samples.shuffle(&mut rng);

    // e.g. 100 samples * 0.8 = 80 → first 80 are training
    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let held_out = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} held out ({}% / {}%)",
        samples.len(),
        held_out.len(),
        (samples.len() * 100) / total.max(1),
        (held_out.len() * 100) / total.max(1),
    );

    (samples, held_out)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, held) = split_seeded(items, 0.8, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(held.len(),  20);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost in the split
        let items: Vec<usize> = (0..50).collect();
        let (train, held) = split_seeded(items, 0.7, 42);
        let mut all: Vec<usize> = train.into_iter().chain(held).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let items: Vec<usize> = (0..100).collect();
        let (train_a, held_a) = split_seeded(items.clone(), 0.8, 42);
        let (train_b, held_b) = split_seeded(items, 0.8, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(held_a, held_b);
    }

    #[test]
    fn test_different_seed_different_shuffle() {
        let items: Vec<usize> = (0..100).collect();
        let (train_a, _) = split_seeded(items.clone(), 0.8, 42);
        let (train_b, _) = split_seeded(items, 0.8, 43);
        assert_ne!(train_a, train_b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, held) = split_seeded(items, 0.8, 42);
        assert!(train.is_empty());
        assert!(held.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        // 1.0 fraction means everything goes to training
        let items: Vec<usize> = (0..10).collect();
        let (train, held) = split_seeded(items, 1.0, 42);
        assert_eq!(train.len(), 10);
        assert!(held.is_empty());
    }
}
