//! End-to-end training: split, preprocess, (tune), fit, evaluate.
//!
//! The outer split is one fold of a stratified K-fold partition (`holdout_fold`,
//! fold 0 by default); its test partition is the holdout set. Tuning runs an
//! inner stratified K-fold cross-validation on the raw outer training partition
//! only, and every inner fold fits its own scaling on its own train rows.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_LEARNING_RATE;
use crate::preprocess::{Preprocessed, preprocess, transform_raw};
use crate::tune::{AccuracyEvaluator, Execution, SearchConfig, grid_search};
use crate::{
    ClassMetrics, DataBlock, Dataset, Error, FeatureWeighting, FitReport, HyperparameterGrid,
    Hyperparameters, LogisticRegression, Matrix, Metrics, MetricsSummary, Preprocessing, Result,
    ScalingParams, StratifiedSplitter,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Outer fold count; the holdout is one fold, i.e. `1 / folds` of the data.
    pub folds: usize,
    /// Fold index used as the holdout set.
    pub holdout_fold: usize,
    /// Fold count for cross-validation during tuning.
    pub inner_folds: usize,
    /// Shuffle seed for every stratified split.
    pub seed: u64,
    pub learning_rate: f64,
    pub preprocessing: Preprocessing,
    /// Used only when `preprocessing` weights.
    pub weighting: FeatureWeighting,
    pub grid: HyperparameterGrid,
    pub execution: Execution,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            holdout_fold: 0,
            inner_folds: 5,
            seed: StratifiedSplitter::DEFAULT_SEED,
            learning_rate: DEFAULT_LEARNING_RATE,
            preprocessing: Preprocessing::None,
            weighting: FeatureWeighting::survey(),
            grid: HyperparameterGrid::default(),
            execution: Execution::Sequential,
        }
    }
}

impl TrainerConfig {
    /// Preset for the 12-answer survey: standardize, then boost severity answers.
    pub fn survey() -> Self {
        Self {
            preprocessing: Preprocessing::ScaleAndWeight,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            return Err(Error::InvalidConfig(format!(
                "folds must be >= 2, got {}",
                self.folds
            )));
        }
        if self.inner_folds < 2 {
            return Err(Error::InvalidConfig(format!(
                "inner_folds must be >= 2, got {}",
                self.inner_folds
            )));
        }
        if self.holdout_fold >= self.folds {
            return Err(Error::InvalidConfig(format!(
                "holdout_fold needs to be between 0 and {}, got {}",
                self.folds - 1,
                self.holdout_fold
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        self.weighting.validate()?;
        self.grid.validate()
    }
}

/// A trained model with everything needed to use and judge it.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: LogisticRegression,
    hyperparameters: Hyperparameters,
    metrics: MetricsSummary,
    class_metrics: Vec<ClassMetrics>,
    scaling: Option<ScalingParams>,
    weighting: Option<FeatureWeighting>,
}

impl TrainedModel {
    #[inline]
    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    #[inline]
    pub fn hyperparameters(&self) -> Hyperparameters {
        self.hyperparameters
    }

    /// Holdout metrics.
    #[inline]
    pub fn metrics(&self) -> MetricsSummary {
        self.metrics
    }

    /// Holdout precision, recall, F1 and support per class.
    #[inline]
    pub fn class_metrics(&self) -> &[ClassMetrics] {
        &self.class_metrics
    }

    /// Scaling fitted on the training partition, if scaling was applied.
    ///
    /// Raw vectors must go through these before [`LogisticRegression::predict`];
    /// [`TrainedModel::predict_raw`] does that.
    #[inline]
    pub fn scaling(&self) -> Option<&ScalingParams> {
        self.scaling.as_ref()
    }

    #[inline]
    pub fn weighting(&self) -> Option<&FeatureWeighting> {
        self.weighting.as_ref()
    }

    #[inline]
    pub fn fit_report(&self) -> FitReport {
        self.model.report()
    }

    /// Predict from an untransformed feature vector.
    pub fn predict_raw(&self, x: &[f64]) -> Result<usize> {
        let x = transform_raw(x, self.scaling.as_ref(), self.weighting.as_ref())?;
        self.model.predict(&x)
    }

    /// Predict every row of an untransformed feature matrix.
    pub fn predict_raw_batch(&self, features: &Matrix) -> Result<Vec<usize>> {
        features.iter_rows().map(|x| self.predict_raw(x)).collect()
    }
}

/// Owns the outer split of one dataset and trains models on it.
#[derive(Debug, Clone)]
pub struct Trainer<'a> {
    dataset: &'a Dataset,
    config: TrainerConfig,
    splitter: StratifiedSplitter,
}

impl<'a> Trainer<'a> {
    pub fn new(dataset: &'a Dataset, config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        let splitter = StratifiedSplitter::for_dataset(dataset, config.folds, config.seed)?;
        Ok(Self {
            dataset,
            config,
            splitter,
        })
    }

    #[inline]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    #[inline]
    pub fn splitter(&self) -> &StratifiedSplitter {
        &self.splitter
    }

    /// Fit with explicit hyperparameters and evaluate on the holdout.
    pub fn fit(&self, hyperparameters: Hyperparameters) -> Result<TrainedModel> {
        hyperparameters.validate()?;
        self.fit_block(self.outer_block()?, hyperparameters)
    }

    /// Grid-search hyperparameters on the training partition, then fit.
    pub fn fit_tuned(&self) -> Result<TrainedModel> {
        let block = self.outer_block()?;
        let search = SearchConfig {
            folds: self.config.inner_folds,
            seed: self.config.seed,
            execution: self.config.execution,
        };
        let evaluator = AccuracyEvaluator {
            learning_rate: self.config.learning_rate,
            preprocessing: self.config.preprocessing,
            weighting: self.config.weighting,
        };
        let outcome = grid_search(&self.config.grid, &block.train, &search, &evaluator)?;
        self.fit_block(block, outcome.best)
    }

    /// Fit again with the hyperparameters `previous` was trained with.
    pub fn retrain(&self, previous: &TrainedModel) -> Result<TrainedModel> {
        self.fit(previous.hyperparameters)
    }

    fn outer_block(&self) -> Result<DataBlock> {
        self.splitter.block(self.dataset, self.config.holdout_fold)
    }

    fn fit_block(
        &self,
        block: DataBlock,
        hyperparameters: Hyperparameters,
    ) -> Result<TrainedModel> {
        let Preprocessed { block, scaling } =
            preprocess(&block, self.config.preprocessing, &self.config.weighting)?;
        let model = LogisticRegression::fit(
            block.train.features(),
            block.train.labels(),
            self.dataset.num_classes(),
            hyperparameters,
            self.config.learning_rate,
        )?;

        let predicted = model.predict_batch(block.test.features())?;
        let holdout = Metrics::new(block.test.labels(), &predicted, self.dataset.num_classes())?;
        let metrics = holdout.summary()?;
        tracing::info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            train = block.train.len(),
            holdout = block.test.len(),
            "holdout evaluation"
        );

        Ok(TrainedModel {
            model,
            hyperparameters,
            metrics,
            class_metrics: holdout.per_class(),
            scaling,
            weighting: self
                .config
                .preprocessing
                .weights()
                .then_some(self.config.weighting),
        })
    }
}
