//! Stratified K-fold splitting.
//!
//! Sample indices are grouped by class, each group is shuffled with a seeded RNG,
//! and the shuffled indices are dealt round-robin into `K` folds. Fold `i` is the
//! test partition of split `i`; the remaining folds (in fold order) form its
//! training partition. The same labels and seed always produce the same splits.
//!
//! A class with fewer than `K` samples leaves some folds without that class.
//! This is tolerated.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{DataBlock, Dataset, Error, Result};

/// One train/test partition of the index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct StratifiedSplitter {
    folds: Vec<Fold>,
    seed: u64,
}

impl StratifiedSplitter {
    /// Seed used by the pipeline when none is configured.
    pub const DEFAULT_SEED: u64 = 42;

    /// Compute `num_folds` stratified splits of `labels`.
    pub fn new(labels: &[usize], num_classes: usize, num_folds: usize, seed: u64) -> Result<Self> {
        if num_folds < 2 {
            return Err(Error::InvalidConfig(format!(
                "num_folds must be >= 2, got {num_folds}"
            )));
        }
        if num_classes == 0 {
            return Err(Error::InvalidConfig("num_classes must be > 0".to_owned()));
        }

        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
        for (idx, &label) in labels.iter().enumerate() {
            if label >= num_classes {
                return Err(Error::LabelOutOfRange { label, num_classes });
            }
            by_class[label].push(idx);
        }

        // One RNG shared across classes, consumed in class order.
        let mut rng = StdRng::seed_from_u64(seed);
        for indices in &mut by_class {
            indices.shuffle(&mut rng);
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); num_folds];
        for indices in &by_class {
            for (j, &idx) in indices.iter().enumerate() {
                buckets[j % num_folds].push(idx);
            }
        }

        let folds = (0..num_folds)
            .map(|i| {
                let mut train = Vec::with_capacity(labels.len() - buckets[i].len());
                for (j, bucket) in buckets.iter().enumerate() {
                    if j != i {
                        train.extend_from_slice(bucket);
                    }
                }
                Fold {
                    train,
                    test: buckets[i].clone(),
                }
            })
            .collect();

        Ok(Self { folds, seed })
    }

    /// Splits for `dataset`.
    pub fn for_dataset(dataset: &Dataset, num_folds: usize, seed: u64) -> Result<Self> {
        Self::new(dataset.labels(), dataset.num_classes(), num_folds, seed)
    }

    #[inline]
    pub fn num_folds(&self) -> usize {
        self.folds.len()
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    /// The `index`-th split.
    pub fn fold(&self, index: usize) -> Result<&Fold> {
        self.folds.get(index).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "fold index needs to be between 0 and {}, got {index}",
                self.folds.len() - 1
            ))
        })
    }

    /// Materialize the `index`-th split of `dataset`.
    ///
    /// `dataset` must be the one whose labels built this splitter.
    pub fn block(&self, dataset: &Dataset, index: usize) -> Result<DataBlock> {
        let fold = self.fold(index)?;
        let covered = fold.train.len() + fold.test.len();
        if covered != dataset.len() {
            return Err(Error::mismatch(
                "block",
                (covered, 1),
                (dataset.len(), 1),
            ));
        }
        Ok(DataBlock {
            train: dataset.subset(&fold.train),
            test: dataset.subset(&fold.test),
        })
    }
}
