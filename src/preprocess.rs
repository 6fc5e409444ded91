//! Feature preprocessing.
//!
//! Two transforms, both fit on a training partition only and then applied the
//! same way to the paired test partition:
//!
//! - standardization with per-feature mean and Bessel-corrected standard deviation
//! - a fixed multiplicative boost on a contiguous range of feature columns
//!
//! Neither transform mutates its input.

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DataBlock, Error, Matrix, Result};

/// Per-feature normal distribution parameters fit on a training partition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParams {
    mean: Vec<f64>,
    std_dev: Vec<f64>,
}

impl ScalingParams {
    /// Fit mean and sample standard deviation (divisor `N - 1`) per column.
    ///
    /// With a single row the deviation is reported as 0.
    pub fn fit(data: &Matrix) -> Result<Self> {
        if data.rows() == 0 {
            return Err(Error::InvalidData(
                "cannot fit scaling parameters on an empty matrix".to_owned(),
            ));
        }
        let n = data.rows() as f64;
        let mut mean = vec![0.0_f64; data.cols()];
        for row in data.iter_rows() {
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut std_dev = vec![0.0_f64; data.cols()];
        if data.rows() > 1 {
            for row in data.iter_rows() {
                for ((s, &x), &m) in std_dev.iter_mut().zip(row).zip(&mean) {
                    let d = x - m;
                    *s = d.mul_add(d, *s);
                }
            }
            for s in &mut std_dev {
                *s = (*s / (n - 1.0)).sqrt();
            }
        }

        Ok(Self { mean, std_dev })
    }

    #[inline]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[inline]
    pub fn std_dev(&self) -> &[f64] {
        &self.std_dev
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.mean.len()
    }

    /// `(x - mean) / std_dev` per column; a zero deviation divides by 1.
    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        if data.cols() != self.num_features() {
            return Err(Error::mismatch(
                "scale",
                data.shape(),
                (1, self.num_features()),
            ));
        }
        let mut out = data.clone();
        for i in 0..out.rows() {
            self.transform_in_place(out.row_mut(i));
        }
        Ok(out)
    }

    /// Standardize a single raw feature vector.
    pub fn transform_vector(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.num_features() {
            return Err(Error::mismatch(
                "scale",
                (x.len(), 1),
                (self.num_features(), 1),
            ));
        }
        let mut out = x.to_vec();
        self.transform_in_place(&mut out);
        Ok(out)
    }

    #[inline]
    fn transform_in_place(&self, row: &mut [f64]) {
        for ((x, &m), &s) in row.iter_mut().zip(&self.mean).zip(&self.std_dev) {
            let s = if s == 0.0 { 1.0 } else { s };
            *x = (*x - m) / s;
        }
    }
}

/// Fixed boost on a contiguous range of feature columns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "WeightingFields"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureWeighting {
    start: usize,
    end: usize,
    factor: f64,
}

/// Unchecked wire form; deserialization goes through [`FeatureWeighting::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct WeightingFields {
    start: usize,
    end: usize,
    factor: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<WeightingFields> for FeatureWeighting {
    type Error = Error;

    fn try_from(fields: WeightingFields) -> Result<Self> {
        Self::new(fields.start..fields.end, fields.factor)
    }
}

impl FeatureWeighting {
    /// Survey answers 3..=11 rate problem severity on a 3-point scale.
    pub const SURVEY_SEVERITY_COLUMNS: Range<usize> = 3..12;
    pub const SURVEY_SEVERITY_BOOST: f64 = 1000.0;

    /// Multiply columns `columns` by `factor`.
    pub fn new(columns: Range<usize>, factor: f64) -> Result<Self> {
        let weighting = Self {
            start: columns.start,
            end: columns.end,
            factor,
        };
        weighting.validate()?;
        Ok(weighting)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidConfig(format!(
                "weighting range {:?} is reversed",
                self.start..self.end
            )));
        }
        if !self.factor.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "weighting factor must be finite, got {}",
                self.factor
            )));
        }
        Ok(())
    }

    /// The hand-tuned weighting used for the 12-answer survey.
    pub const fn survey() -> Self {
        Self {
            start: Self::SURVEY_SEVERITY_COLUMNS.start,
            end: Self::SURVEY_SEVERITY_COLUMNS.end,
            factor: Self::SURVEY_SEVERITY_BOOST,
        }
    }

    #[inline]
    pub fn columns(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    fn check_width(&self, cols: usize) -> Result<()> {
        self.validate()?;
        if self.end > cols {
            return Err(Error::mismatch("weight", (1, self.end), (1, cols)));
        }
        Ok(())
    }

    pub fn apply(&self, data: &Matrix) -> Result<Matrix> {
        self.check_width(data.cols())?;
        let mut out = data.clone();
        for i in 0..out.rows() {
            for x in &mut out.row_mut(i)[self.start..self.end] {
                *x *= self.factor;
            }
        }
        Ok(out)
    }

    pub fn apply_vector(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.check_width(x.len())?;
        let mut out = x.to_vec();
        for v in &mut out[self.start..self.end] {
            *v *= self.factor;
        }
        Ok(out)
    }
}

impl Default for FeatureWeighting {
    fn default() -> Self {
        Self::survey()
    }
}

/// Which transforms the trainer applies.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preprocessing {
    #[default]
    None,
    Scale,
    Weight,
    ScaleAndWeight,
}

impl Preprocessing {
    #[inline]
    pub fn scales(self) -> bool {
        matches!(self, Preprocessing::Scale | Preprocessing::ScaleAndWeight)
    }

    #[inline]
    pub fn weights(self) -> bool {
        matches!(self, Preprocessing::Weight | Preprocessing::ScaleAndWeight)
    }
}

/// A transformed block plus the fitted scaling parameters (if scaling ran).
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub block: DataBlock,
    pub scaling: Option<ScalingParams>,
}

/// Fit on `block.train` and transform both partitions: scale first, then weight.
pub fn preprocess(
    block: &DataBlock,
    mode: Preprocessing,
    weighting: &FeatureWeighting,
) -> Result<Preprocessed> {
    let mut train = block.train.features().clone();
    let mut test = block.test.features().clone();

    let scaling = if mode.scales() {
        let params = ScalingParams::fit(&train)?;
        train = params.transform(&train)?;
        test = params.transform(&test)?;
        Some(params)
    } else {
        None
    };

    if mode.weights() {
        train = weighting.apply(&train)?;
        test = weighting.apply(&test)?;
    }

    Ok(Preprocessed {
        block: DataBlock {
            train: block.train.with_features(train)?,
            test: block.test.with_features(test)?,
        },
        scaling,
    })
}

/// Apply the transforms a trained pipeline used to one raw feature vector.
pub fn transform_raw(
    x: &[f64],
    scaling: Option<&ScalingParams>,
    weighting: Option<&FeatureWeighting>,
) -> Result<Vec<f64>> {
    let mut out = match scaling {
        Some(params) => params.transform_vector(x)?,
        None => x.to_vec(),
    };
    if let Some(w) = weighting {
        out = w.apply_vector(&out)?;
    }
    Ok(out)
}
