//! Party-affiliation classifier for a fixed-length survey.
//!
//! `survey-classifier` is a from-scratch multinomial logistic regression pipeline:
//! stratified K-fold splitting, optional standardization and feature weighting,
//! batch gradient descent with L2 regularization, grid-search tuning with nested
//! cross-validation, and support-weighted multi-class metrics.
//!
//! # Design goals
//!
//! - Deterministic: the only randomness is the seeded shuffle in
//!   [`StratifiedSplitter`]; same data and seed, same model.
//! - Clear contracts: shapes are validated at every API boundary and mismatches
//!   return [`Error::DimensionMismatch`] rather than being truncated or padded.
//! - No leakage: scaling parameters are fit on a training partition and then
//!   reused for its test partition and for every later raw vector.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - [`Matrix`] stores values contiguously in row-major layout.
//! - Features are `(N, M)`, labels are `N` integers in `[0, num_classes)`.
//! - Model weights are `(num_classes, M)`, biases `(num_classes,)`.
//!
//! # Pipeline
//!
//! - [`Trainer::fit`]: outer split, preprocess, train with explicit
//!   [`Hyperparameters`], evaluate on the holdout.
//! - [`Trainer::fit_tuned`]: the same, with hyperparameters chosen by
//!   [`tune::grid_search`] on the training partition.
//! - [`Predictor`]: tune once, then retrain with the chosen hyperparameters after
//!   every recorded sample.
//!
//! # Quick start
//!
//! ```rust
//! use survey_classifier::{Dataset, Hyperparameters, Trainer, TrainerConfig};
//!
//! # fn main() -> survey_classifier::Result<()> {
//! let mut rows = Vec::new();
//! let mut labels = Vec::new();
//! for i in 0..20 {
//!     let class = i % 2;
//!     let x = if class == 0 { -2.0 } else { 2.0 };
//!     rows.push(vec![x + 0.01 * i as f64, x]);
//!     labels.push(class);
//! }
//! let dataset = Dataset::from_rows(&rows, &labels, 2)?;
//!
//! let trainer = Trainer::new(&dataset, TrainerConfig::default())?;
//! let trained = trainer.fit(Hyperparameters::new(1e-4, 1e-6, 300)?)?;
//!
//! assert_eq!(trained.predict_raw(&[2.5, 2.0])?, 1);
//! assert!(trained.metrics().accuracy > 0.9);
//! # Ok(())
//! # }
//! ```

pub mod affiliation;
pub mod data;
pub mod error;
pub mod linalg;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod preprocess;
pub mod softmax;
pub mod split;
pub mod trainer;
pub mod tune;

pub use affiliation::{Affiliation, NUM_AFFILIATIONS, SURVEY_FEATURES, validate_answers};
pub use data::{DataBlock, Dataset};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use metrics::{Averaging, ClassMetrics, ConfusionMatrix, Metrics, MetricsSummary};
pub use model::{FitReport, Hyperparameters, LogisticRegression};
pub use predictor::Predictor;
pub use preprocess::{FeatureWeighting, Preprocessing, ScalingParams};
pub use split::{Fold, StratifiedSplitter};
pub use trainer::{TrainedModel, Trainer, TrainerConfig};
pub use tune::{Execution, HyperparameterGrid};
