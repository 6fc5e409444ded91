//! Grid search over hyperparameters with K-fold cross-validation.
//!
//! [`grid_search`] is a pure function of the grid, the training partition and a
//! [`FoldEvaluator`]. Each combination is scored by the mean of its fold scores;
//! the highest mean wins and exact ties go to the combination that comes first
//! in grid order. Scores are always collected in grid order before selection, so
//! parallel and sequential execution select the same winner.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::preprocess::{Preprocessed, preprocess};
use crate::{
    DataBlock, Dataset, Error, FeatureWeighting, Hyperparameters, LogisticRegression, Metrics,
    Preprocessing, Result, StratifiedSplitter,
};

/// The exhaustive search space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparameterGrid {
    pub lambdas: Vec<f64>,
    pub tolerances: Vec<f64>,
    pub max_iters: Vec<usize>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        Self {
            lambdas: vec![1e-5, 1e-4, 1e-3, 1e-2, 1e-1, 1.0],
            tolerances: vec![1e-4, 1e-5, 1e-6],
            max_iters: vec![100, 300, 900],
        }
    }
}

impl HyperparameterGrid {
    pub fn len(&self) -> usize {
        self.lambdas.len() * self.tolerances.len() * self.max_iters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations, lambda outermost and max_iter innermost.
    pub fn combinations(&self) -> Vec<Hyperparameters> {
        let mut out = Vec::with_capacity(self.len());
        for &lambda in &self.lambdas {
            for &tolerance in &self.tolerances {
                for &max_iter in &self.max_iters {
                    out.push(Hyperparameters {
                        lambda,
                        tolerance,
                        max_iter,
                    });
                }
            }
        }
        out
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidConfig(
                "hyperparameter grid must not be empty".to_owned(),
            ));
        }
        for hp in self.combinations() {
            hp.validate()?;
        }
        Ok(())
    }
}

/// How combinations are evaluated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Sequential,
    /// One rayon task per combination.
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Scores one hyperparameter combination on one train/validation split.
pub trait FoldEvaluator: Sync {
    fn evaluate(&self, hyperparameters: &Hyperparameters, block: &DataBlock) -> Result<f64>;
}

impl<F> FoldEvaluator for F
where
    F: Fn(&Hyperparameters, &DataBlock) -> Result<f64> + Sync,
{
    fn evaluate(&self, hyperparameters: &Hyperparameters, block: &DataBlock) -> Result<f64> {
        self(hyperparameters, block)
    }
}

/// Preprocess the fold, train on its train partition, score accuracy on its
/// test partition.
///
/// Scaling statistics come from the fold's own train partition, so no
/// validation row influences the model that is scored on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyEvaluator {
    pub learning_rate: f64,
    pub preprocessing: Preprocessing,
    pub weighting: FeatureWeighting,
}

impl AccuracyEvaluator {
    /// Evaluator without preprocessing.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            preprocessing: Preprocessing::None,
            weighting: FeatureWeighting::survey(),
        }
    }
}

impl FoldEvaluator for AccuracyEvaluator {
    fn evaluate(&self, hyperparameters: &Hyperparameters, block: &DataBlock) -> Result<f64> {
        let Preprocessed { block, .. } = preprocess(block, self.preprocessing, &self.weighting)?;
        let model = LogisticRegression::fit(
            block.train.features(),
            block.train.labels(),
            block.train.num_classes(),
            *hyperparameters,
            self.learning_rate,
        )?;
        let predicted = model.predict_batch(block.test.features())?;
        Ok(Metrics::new(block.test.labels(), &predicted, block.test.num_classes())?.accuracy())
    }
}

/// Cross-validation settings for the inner search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub folds: usize,
    pub seed: u64,
    pub execution: Execution,
}

/// Result of a grid search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best: Hyperparameters,
    pub best_score: f64,
    /// Every combination with its mean fold score, in grid order.
    pub scores: Vec<(Hyperparameters, f64)>,
}

/// Mean score of `hyperparameters` over the folds that have test samples.
pub fn cross_validate<E: FoldEvaluator + ?Sized>(
    hyperparameters: &Hyperparameters,
    blocks: &[DataBlock],
    evaluator: &E,
) -> Result<f64> {
    let mut total = 0.0_f64;
    let mut used = 0_usize;
    for block in blocks.iter().filter(|b| !b.test.is_empty()) {
        total += evaluator.evaluate(hyperparameters, block)?;
        used += 1;
    }
    if used == 0 {
        return Err(Error::InvalidData(
            "no cross-validation fold has test samples".to_owned(),
        ));
    }
    Ok(total / used as f64)
}

/// Exhaustive search over `grid` using `config.folds`-fold CV on `training`.
pub fn grid_search<E: FoldEvaluator + ?Sized>(
    grid: &HyperparameterGrid,
    training: &Dataset,
    config: &SearchConfig,
    evaluator: &E,
) -> Result<SearchOutcome> {
    grid.validate()?;
    let splitter = StratifiedSplitter::for_dataset(training, config.folds, config.seed)?;
    let blocks = (0..splitter.num_folds())
        .map(|i| splitter.block(training, i))
        .collect::<Result<Vec<_>>>()?;

    let combinations = grid.combinations();
    let means: Vec<f64> = match config.execution {
        Execution::Sequential => combinations
            .iter()
            .map(|hp| cross_validate(hp, &blocks, evaluator))
            .collect::<Result<_>>()?,
        #[cfg(feature = "parallel")]
        Execution::Parallel => {
            use rayon::prelude::*;
            combinations
                .par_iter()
                .map(|hp| cross_validate(hp, &blocks, evaluator))
                .collect::<Result<_>>()?
        }
    };

    let mut best: Option<(Hyperparameters, f64)> = None;
    for (hp, &score) in combinations.iter().zip(&means) {
        tracing::debug!(
            lambda = hp.lambda,
            tolerance = hp.tolerance,
            max_iter = hp.max_iter,
            mean_score = score,
            "evaluated hyperparameters"
        );
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((*hp, score));
        }
    }

    let (best, best_score) = best.ok_or_else(|| {
        Error::InvalidConfig("hyperparameter grid must not be empty".to_owned())
    })?;
    tracing::info!(
        lambda = best.lambda,
        tolerance = best.tolerance,
        max_iter = best.max_iter,
        mean_score = best_score,
        "selected hyperparameters"
    );

    Ok(SearchOutcome {
        best,
        best_score,
        scores: combinations.into_iter().zip(means).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalingParams;

    fn tiny_dataset() -> Dataset {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64]).collect();
        let labels: Vec<usize> = (0..12).map(|i| usize::from(i >= 6)).collect();
        Dataset::from_rows(&rows, &labels, 2).unwrap()
    }

    fn config() -> SearchConfig {
        SearchConfig {
            folds: 3,
            seed: 42,
            execution: Execution::Sequential,
        }
    }

    #[test]
    fn default_grid_has_54_combinations_in_order() {
        let grid = HyperparameterGrid::default();
        let combos = grid.combinations();
        assert_eq!(combos.len(), 54);
        assert_eq!(
            combos[0],
            Hyperparameters {
                lambda: 1e-5,
                tolerance: 1e-4,
                max_iter: 100
            }
        );
        assert_eq!(combos[1].max_iter, 300);
        assert_eq!(combos[3].tolerance, 1e-5);
        assert_eq!(combos[53].lambda, 1.0);
    }

    #[test]
    fn picks_highest_mean_score() {
        let grid = HyperparameterGrid {
            lambdas: vec![0.0, 0.5, 1.0],
            tolerances: vec![1e-4],
            max_iters: vec![10],
        };
        let evaluator = |hp: &Hyperparameters, _: &DataBlock| -> Result<f64> {
            Ok(1.0 - (hp.lambda - 0.5).abs())
        };
        let outcome = grid_search(&grid, &tiny_dataset(), &config(), &evaluator).unwrap();
        assert_eq!(outcome.best.lambda, 0.5);
        assert_eq!(outcome.best_score, 1.0);
        assert_eq!(outcome.scores.len(), 3);
    }

    #[test]
    fn ties_go_to_first_combination() {
        let grid = HyperparameterGrid {
            lambdas: vec![0.3, 0.1, 0.2],
            tolerances: vec![1e-4, 1e-5],
            max_iters: vec![10],
        };
        let evaluator = |_: &Hyperparameters, _: &DataBlock| -> Result<f64> { Ok(0.5) };
        let outcome = grid_search(&grid, &tiny_dataset(), &config(), &evaluator).unwrap();
        assert_eq!(outcome.best.lambda, 0.3);
        assert_eq!(outcome.best.tolerance, 1e-4);
    }

    #[test]
    fn cross_validate_averages_over_folds() {
        let ds = tiny_dataset();
        let splitter = StratifiedSplitter::for_dataset(&ds, 3, 42).unwrap();
        let blocks: Vec<_> = (0..3).map(|i| splitter.block(&ds, i).unwrap()).collect();
        let evaluator =
            |_: &Hyperparameters, b: &DataBlock| -> Result<f64> { Ok(b.test.len() as f64) };
        let mean = cross_validate(&Hyperparameters::default(), &blocks, &evaluator).unwrap();
        assert_eq!(mean, 4.0);
    }

    #[test]
    fn evaluator_errors_propagate() {
        let evaluator = |_: &Hyperparameters, _: &DataBlock| -> Result<f64> {
            Err(Error::InvalidData("boom".to_owned()))
        };
        let grid = HyperparameterGrid {
            lambdas: vec![0.0],
            tolerances: vec![1e-4],
            max_iters: vec![1],
        };
        assert!(grid_search(&grid, &tiny_dataset(), &config(), &evaluator).is_err());
    }

    #[test]
    fn accuracy_evaluator_scores_separable_data() {
        let ds = tiny_dataset();
        let splitter = StratifiedSplitter::for_dataset(&ds, 3, 42).unwrap();
        let block = splitter.block(&ds, 0).unwrap();
        let hp = Hyperparameters::new(0.0, 1e-6, 900).unwrap();
        let score = AccuracyEvaluator::new(0.1)
            .evaluate(&hp, &block)
            .unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn accuracy_evaluator_scales_with_fold_statistics() {
        let ds = tiny_dataset();
        let splitter = StratifiedSplitter::for_dataset(&ds, 3, 42).unwrap();
        let block = splitter.block(&ds, 1).unwrap();
        let hp = Hyperparameters::new(0.0, 1e-6, 300).unwrap();
        let evaluator = AccuracyEvaluator {
            preprocessing: Preprocessing::Scale,
            ..AccuracyEvaluator::new(0.1)
        };

        let prepared = preprocess(&block, Preprocessing::Scale, &evaluator.weighting).unwrap();
        let train_only = ScalingParams::fit(block.train.features()).unwrap();
        assert_eq!(prepared.scaling.as_ref(), Some(&train_only));

        let model = LogisticRegression::fit(
            prepared.block.train.features(),
            prepared.block.train.labels(),
            2,
            hp,
            0.1,
        )
        .unwrap();
        let predicted = model.predict_batch(prepared.block.test.features()).unwrap();
        let expected = Metrics::new(prepared.block.test.labels(), &predicted, 2)
            .unwrap()
            .accuracy();
        assert_eq!(evaluator.evaluate(&hp, &block).unwrap(), expected);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let grid = HyperparameterGrid {
            lambdas: vec![],
            tolerances: vec![1e-4],
            max_iters: vec![1],
        };
        let evaluator = AccuracyEvaluator::new(0.01);
        assert!(matches!(
            grid_search(&grid, &tiny_dataset(), &config(), &evaluator),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let grid = HyperparameterGrid {
            lambdas: vec![0.0, 0.1, 1.0],
            tolerances: vec![1e-4],
            max_iters: vec![50, 100],
        };
        let evaluator = AccuracyEvaluator::new(0.01);
        let ds = tiny_dataset();
        let seq = grid_search(&grid, &ds, &config(), &evaluator).unwrap();
        let par_config = SearchConfig {
            execution: Execution::Parallel,
            ..config()
        };
        let par = grid_search(&grid, &ds, &par_config, &evaluator).unwrap();
        assert_eq!(seq, par);
    }
}
