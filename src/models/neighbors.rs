//! Регрессия k ближайших соседей

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    n_neighbors: usize,
    records: Option<Array2<f64>>,
    targets: Option<Array1<f64>>,
}

impl KNeighborsRegressor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
            records: None,
            targets: None,
        }
    }

    pub fn fit(&mut self, X: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        if X.nrows() != y.len() {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!("{} rows but {} targets", X.nrows(), y.len()),
            ));
        }
        if X.nrows() < self.n_neighbors {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!(
                    "Expected n_neighbors <= n_samples, got {} > {}",
                    self.n_neighbors,
                    X.nrows()
                ),
            ));
        }

        self.records = Some(X.to_owned());
        self.targets = Some(y.to_owned());
        Ok(())
    }

    /// Среднее значение цели по k ближайшим (евклидово расстояние).
    /// При равных расстояниях выигрывает объект, встреченный раньше.
    pub fn predict(&self, X: ArrayView2<f64>) -> Result<Array1<f64>> {
        let (records, targets) = match (&self.records, &self.targets) {
            (Some(records), Some(targets)) => (records, targets),
            _ => return Err(PipelineError::new(ErrorKind::Training, "Model not trained")),
        };
        if X.ncols() != records.ncols() {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!("Expected {} features, got {}", records.ncols(), X.ncols()),
            ));
        }

        let k = self.n_neighbors;
        let mut distances: Vec<(f64, usize)> = Vec::with_capacity(records.nrows());
        let mut predictions = Array1::zeros(X.nrows());

        for (row, sample) in X.rows().into_iter().enumerate() {
            distances.clear();
            distances.extend(records.rows().into_iter().enumerate().map(|(i, r)| {
                let d: f64 = r.iter().zip(sample.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
                (d, i)
            }));
            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            predictions[row] = distances[..k].iter().map(|&(_, i)| targets[i]).sum::<f64>() / k as f64;
        }

        Ok(predictions)
    }
}

impl Default for KNeighborsRegressor {
    fn default() -> Self {
        Self::new(5)
    }
}
