//! Случайный лес: бэггинг деревьев регрессии

#![allow(non_snake_case)]

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PipelineError, Result};
use crate::models::tree::DecisionTreeRegressor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    max_depth: Option<usize>,
    seed: u64,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    pub fn new(seed: u64) -> Self {
        Self::with_params(100, None, seed)
    }

    pub fn with_params(n_estimators: usize, max_depth: Option<usize>, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_depth,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn fit(&mut self, X: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        let n_samples = X.nrows();
        if n_samples == 0 {
            return Err(PipelineError::new(ErrorKind::Training, "Empty dataset"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            // Бутстрэп-выборка с возвращением
            let indices: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut tree = DecisionTreeRegressor::with_params(self.max_depth, 2);
            tree.fit_indices(X, y, indices)?;
            trees.push(tree);
        }
        self.trees = trees;

        Ok(())
    }

    pub fn predict(&self, X: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::new(ErrorKind::Training, "Model not trained"));
        }

        let mut sum = Array1::<f64>::zeros(X.nrows());
        for tree in &self.trees {
            sum += &tree.predict(X)?;
        }

        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn data() -> (Array2<f64>, Array1<f64>) {
        let X = Array2::from_shape_fn((40, 2), |(i, j)| ((i * (j + 3)) % 17) as f64);
        let y = X.column(0).mapv(|v| 3.0 * v) + X.column(1);
        (X, y)
    }

    #[test]
    fn same_seed_gives_same_forest() {
        let (X, y) = data();
        let mut a = RandomForestRegressor::with_params(10, None, 7);
        let mut b = RandomForestRegressor::with_params(10, None, 7);
        a.fit(X.view(), y.view()).unwrap();
        b.fit(X.view(), y.view()).unwrap();

        assert_eq!(a.n_trees(), 10);
        assert_eq!(a.predict(X.view()).unwrap(), b.predict(X.view()).unwrap());
    }

    #[test]
    fn averages_trees_into_good_fit() {
        let (X, y) = data();
        let mut forest = RandomForestRegressor::with_params(20, None, 42);
        forest.fit(X.view(), y.view()).unwrap();
        let pred = forest.predict(X.view()).unwrap();

        let mean = y.mean().unwrap();
        let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        let ss_res: f64 = y.iter().zip(pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
        assert!(1.0 - ss_res / ss_tot > 0.8);
    }

    #[test]
    fn predict_requires_fit() {
        let forest = RandomForestRegressor::new(1);
        assert!(forest.predict(Array2::zeros((1, 2)).view()).is_err());
    }
}
