//! Mean imputation and standardization
//!
//! Both are fitted once on the training matrix and stored in the model
//! artifact. Inference only ever calls `transform`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PipelineError, Result};

/// Replaces NaN with the training mean of the column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    pub means: Vec<f64>,
}

impl MeanImputer {
    pub fn fit(x: &[Vec<f64>], n_features: usize) -> Self {
        let means = (0..n_features)
            .map(|j| {
                let (sum, count) = x
                    .iter()
                    .map(|row| row[j])
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    warn!("Feature column {} has no observed values; imputing 0", j);
                    0.0
                } else {
                    sum / count as f64
                }
            })
            .collect();
        Self { means }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .map(|(&v, &m)| if v.is_nan() { m } else { v })
            .collect()
    }
}

/// Zero mean, unit variance per column (population variance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit on an already imputed matrix
    pub fn fit(x: &[Vec<f64>], n_features: usize) -> Self {
        let n = x.len().max(1) as f64;
        let means: Vec<f64> = (0..n_features)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let scales = (0..n_features)
            .map(|j| {
                let var = x.iter().map(|row| (row[j] - means[j]).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                // Constant columns are centered but not scaled
                if std > 0.0 && std.is_finite() {
                    std
                } else {
                    1.0
                }
            })
            .collect();
        Self { means, scales }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect()
    }
}

/// Imputer and scaler fitted together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub imputer: MeanImputer,
    pub scaler: StandardScaler,
}

impl Preprocessor {
    pub fn n_features(&self) -> usize {
        self.imputer.means.len()
    }

    /// Fit on raw training rows and return the transformed matrix
    pub fn fit_transform(x: &[Vec<f64>], n_features: usize) -> Result<(Self, Vec<Vec<f64>>)> {
        check_width(x, n_features)?;
        let imputer = MeanImputer::fit(x, n_features);
        let imputed: Vec<Vec<f64>> = x.iter().map(|r| imputer.transform_row(r)).collect();
        let scaler = StandardScaler::fit(&imputed, n_features);
        let transformed = imputed.iter().map(|r| scaler.transform_row(r)).collect();
        Ok((Self { imputer, scaler }, transformed))
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_width(x, self.n_features())?;
        Ok(x
            .iter()
            .map(|r| self.scaler.transform_row(&self.imputer.transform_row(r)))
            .collect())
    }
}

pub(crate) fn check_width(x: &[Vec<f64>], n_features: usize) -> Result<()> {
    if let Some((i, row)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
        return Err(PipelineError::Validation(format!(
            "Row {} has {} features, expected {}",
            i,
            row.len(),
            n_features
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imputer_uses_column_mean() {
        let x = vec![vec![1.0, f64::NAN], vec![3.0, 4.0], vec![f64::NAN, 8.0]];
        let imputer = MeanImputer::fit(&x, 2);
        assert_eq!(imputer.means, vec![2.0, 6.0]);
        assert_eq!(imputer.transform_row(&[f64::NAN, 1.0]), vec![2.0, 1.0]);
    }

    #[test]
    fn test_imputer_all_missing_column() {
        let x = vec![vec![f64::NAN], vec![f64::NAN]];
        assert_eq!(MeanImputer::fit(&x, 1).means, vec![0.0]);
    }

    #[test]
    fn test_scaler_standardizes() {
        let x = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&x, 2);
        assert_eq!(scaler.means, vec![2.0, 5.0]);
        assert_eq!(scaler.scales, vec![1.0, 1.0]);
        assert_eq!(scaler.transform_row(&[3.0, 5.0]), vec![1.0, 0.0]);

        let x = vec![vec![0.0], vec![4.0]];
        let scaler = StandardScaler::fit(&x, 1);
        assert_eq!(scaler.scales, vec![2.0]);
    }

    #[test]
    fn test_transform_never_refits() {
        let train = vec![vec![0.0], vec![2.0]];
        let (pre, _) = Preprocessor::fit_transform(&train, 1).unwrap();

        let other = vec![vec![100.0], vec![f64::NAN]];
        let out = pre.transform(&other).unwrap();
        assert_eq!(out[0], vec![99.0]);
        // NaN imputed with the training mean, which standardizes to 0
        assert_eq!(out[1], vec![0.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let train = vec![vec![0.0, 1.0]];
        let (pre, _) = Preprocessor::fit_transform(&train, 2).unwrap();
        assert!(pre.transform(&[vec![1.0]]).is_err());
    }
}
