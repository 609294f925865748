//! Small dense helpers for the sampler (dimension = features + 1)

use crate::error::{PipelineError, Result};

pub type Matrix = Vec<Vec<f64>>;

/// Cholesky factor `L` (lower triangular) with `a = L * L^T`
pub fn cholesky(a: &Matrix) -> Result<Matrix> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let d = a[i][i] - sum;
                if d <= 0.0 || !d.is_finite() {
                    return Err(PipelineError::Validation(
                        "Posterior precision matrix is not positive definite".to_string(),
                    ));
                }
                l[i][j] = d.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }
    Ok(l)
}

/// Solve `L y = b` for lower-triangular `L`
pub fn forward_substitute(l: &Matrix, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[i][k] * y[k]).sum();
        y[i] = (b[i] - sum) / l[i][i];
    }
    y
}

/// Solve `L^T x = y` for lower-triangular `L`
pub fn back_substitute_transpose(l: &Matrix, y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|k| l[k][i] * x[k]).sum();
        x[i] = (y[i] - sum) / l[i][i];
    }
    x
}

/// Solve `a x = b` for symmetric positive definite `a`
pub fn solve_spd(a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
    let l = cholesky(a)?;
    let y = forward_substitute(&l, b);
    Ok(back_substitute_transpose(&l, &y))
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cholesky_reconstructs() {
        let a = vec![
            vec![4.0, 2.0, 0.6],
            vec![2.0, 5.0, 1.0],
            vec![0.6, 1.0, 3.0],
        ];
        let l = cholesky(&a).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| l[i][k] * l[j][k]).sum();
                assert!((v - a[i][j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_solve_spd() {
        let a = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
        let x = solve_spd(&a, &[1.0, 2.0]).unwrap();
        // 4x + y = 1, x + 3y = 2 -> x = 1/11, y = 7/11
        assert!((x[0] - 1.0 / 11.0).abs() < 1e-12);
        assert!((x[1] - 7.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_not_positive_definite() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        assert!(cholesky(&a).is_err());
    }
}
