//! Стандартизация числовых признаков

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PipelineError, Result};

/// Нулевое среднее и единичная дисперсия по каждому столбцу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(X: &Array2<f64>) -> Result<Self> {
        if X.nrows() == 0 {
            return Err(PipelineError::new(ErrorKind::Transformation, "Empty dataset"));
        }

        // Среднее и стандартное отклонение (ddof = 0) по каждому признаку
        let mean = X
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::new(ErrorKind::Transformation, "Failed to compute mean"))?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        Ok(Self { mean, std })
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        if X.ncols() != self.mean.len() {
            return Err(PipelineError::new(
                ErrorKind::Transformation,
                format!("Scaler fitted on {} columns, got {}", self.mean.len(), X.ncols()),
            ));
        }

        // Нормализация: (X - mean) / std
        Ok((X - &self.mean) / &self.std)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}
