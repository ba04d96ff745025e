//! Seeded train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{PigeonholeError, Result};

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// Indices of the training rows.
    pub train_indices: Vec<usize>,
    /// Indices of the held-out test rows.
    pub test_indices: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded RNG and split off `test_size`.
///
/// The same `(n_samples, test_size, seed)` triple always yields the same
/// partition, so repeated runs on identical input are reproducible.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(PigeonholeError::invalid_argument(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let n_test = ((n_samples as f64) * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PigeonholeError::invalid_argument(format!(
            "cannot split {n_samples} samples with test_size {test_size}"
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test, train) = indices.split_at(n_test);
    Ok(TrainTestSplit {
        train_indices: train.to_vec(),
        test_indices: test.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 20);
        assert_eq!(split.train_indices.len(), 80);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(50, 0.2, 42).unwrap();
        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(&split.test_indices)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let a = train_test_split(80, 0.2, 42).unwrap();
        let b = train_test_split(80, 0.2, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = train_test_split(80, 0.2, 42).unwrap();
        let b = train_test_split(80, 0.2, 7).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(train_test_split(10, 0.0, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
        assert!(train_test_split(1, 0.2, 42).is_err());
    }
}
