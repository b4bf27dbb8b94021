//! Линейная регрессия методом наименьших квадратов

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PipelineError, Result};

/// Небольшая регуляризация, чтобы вырожденная система (коллинеарные
/// one-hot столбцы) оставалась разрешимой
const DEFAULT_RIDGE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    alpha: f64,
    weights: Option<Array1<f64>>,
    bias: Option<f64>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::with_alpha(DEFAULT_RIDGE)
    }

    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            weights: None,
            bias: None,
        }
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn bias(&self) -> Option<f64> {
        self.bias
    }

    pub fn fit(&mut self, X: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        let n_samples = X.nrows();
        let n_features = X.ncols();

        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::new(ErrorKind::Training, "Empty dataset"));
        }

        // Центрирование: свободный член не регуляризуется
        let x_mean = X
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::new(ErrorKind::Training, "Failed to compute mean"))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let Xc = &X - &x_mean;
        let yc = &y - y_mean;

        // (X^T X + αI) w = X^T y
        let mut xtx = Xc.t().dot(&Xc);
        for i in 0..n_features {
            xtx[[i, i]] += self.alpha;
        }
        let xty = Xc.t().dot(&yc);

        let weights = solve_linear_system(&xtx, &xty)?;
        self.bias = Some(y_mean - x_mean.dot(&weights));
        self.weights = Some(weights);

        Ok(())
    }

    pub fn predict(&self, X: ArrayView2<f64>) -> Result<Array1<f64>> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| PipelineError::new(ErrorKind::Training, "Model not trained"))?;
        if X.ncols() != weights.len() {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!("Expected {} features, got {}", weights.len(), X.ncols()),
            ));
        }
        let bias = self.bias.unwrap_or(0.0);

        Ok(X.dot(weights) + bias)
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Метод Гаусса с выбором главного элемента по столбцу
fn solve_linear_system(A: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = A.nrows();
    let mut augmented = Array2::<f64>::zeros((n, n + 1));
    augmented.slice_mut(ndarray::s![.., ..n]).assign(A);
    augmented.column_mut(n).assign(b);

    // Прямой ход
    for i in 0..n {
        let mut max_row = i;
        let mut max_val = augmented[[i, i]].abs();
        for k in (i + 1)..n {
            if augmented[[k, i]].abs() > max_val {
                max_val = augmented[[k, i]].abs();
                max_row = k;
            }
        }

        if max_row != i {
            for j in 0..=n {
                augmented.swap([i, j], [max_row, j]);
            }
        }

        let pivot = augmented[[i, i]];
        if pivot.abs() < 1e-12 {
            return Err(PipelineError::new(ErrorKind::Training, "Singular matrix"));
        }

        for k in (i + 1)..n {
            let factor = augmented[[k, i]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in i..=n {
                augmented[[k, j]] -= factor * augmented[[i, j]];
            }
        }
    }

    // Обратный ход
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = augmented[[i, n]];
        for j in (i + 1)..n {
            sum -= augmented[[i, j]] * x[j];
        }
        x[i] = sum / augmented[[i, i]];
    }

    Ok(x)
}
