//! Retraining predictor.
//!
//! The first model is tuned with a full grid search. Every recorded sample is
//! appended to the dataset and the model is retrained from scratch with the
//! hyperparameters chosen by that search, which keeps turnaround short.

use crate::{Dataset, Result, TrainedModel, Trainer, TrainerConfig};

#[derive(Debug, Clone)]
pub struct Predictor {
    dataset: Dataset,
    config: TrainerConfig,
    trained: TrainedModel,
}

impl Predictor {
    /// Tune and train on `dataset`.
    pub fn new(dataset: Dataset, config: TrainerConfig) -> Result<Self> {
        let trained = Trainer::new(&dataset, config.clone())?.fit_tuned()?;
        Ok(Self {
            dataset,
            config,
            trained,
        })
    }

    /// Predict the class of one raw (untransformed) feature vector.
    pub fn predict(&self, raw: &[f64]) -> Result<usize> {
        self.trained.predict_raw(raw)
    }

    /// Append a labelled sample and retrain with the current hyperparameters.
    ///
    /// On error the dataset and model are left unchanged.
    pub fn record(&mut self, raw: &[f64], label: usize) -> Result<()> {
        let mut dataset = self.dataset.clone();
        dataset.push(raw, label)?;
        let trained = Trainer::new(&dataset, self.config.clone())?.retrain(&self.trained)?;
        self.dataset = dataset;
        self.trained = trained;
        Ok(())
    }

    #[inline]
    pub fn model(&self) -> &TrainedModel {
        &self.trained
    }

    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[inline]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}
