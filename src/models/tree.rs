//! Дерево решений для регрессии (CART, критерий MSE)

#![allow(non_snake_case)]

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    max_depth: Option<usize>,
    min_samples_split: usize,
    n_features: usize,
    root: Option<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl DecisionTreeRegressor {
    /// Без ограничения глубины, минимум 2 объекта для разделения
    pub fn new() -> Self {
        Self::with_params(None, 2)
    }

    pub fn with_params(max_depth: Option<usize>, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            n_features: 0,
            root: None,
        }
    }

    pub fn fit(&mut self, X: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        self.fit_indices(X, y, (0..X.nrows()).collect())
    }

    /// Обучение на подмножестве строк (индексы могут повторяться)
    pub(crate) fn fit_indices(&mut self, X: ArrayView2<f64>, y: ArrayView1<f64>, indices: Vec<usize>) -> Result<()> {
        if X.nrows() == 0 || indices.is_empty() {
            return Err(PipelineError::new(ErrorKind::Training, "Empty dataset"));
        }
        if X.nrows() != y.len() {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!("{} rows but {} targets", X.nrows(), y.len()),
            ));
        }

        self.n_features = X.ncols();
        self.root = Some(self.build_tree(&X, &y, 0, indices));
        Ok(())
    }

    /// Количество листьев обученного дерева
    pub fn n_leaves(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }

    fn build_tree(&self, X: &ArrayView2<f64>, y: &ArrayView1<f64>, depth: usize, indices: Vec<usize>) -> TreeNode {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        let pure = indices.iter().all(|&i| y[i] == y[indices[0]]);
        if depth_reached || pure || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { value: mean };
        }

        let Some(best) = self.find_best_split(X, y, &indices) else {
            // Все признаки постоянны на этом узле
            return TreeNode::Leaf { value: mean };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, best.feature]] <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build_tree(X, y, depth + 1, left_indices)),
            right: Box::new(self.build_tree(X, y, depth + 1, right_indices)),
        }
    }

    /// Перебор всех порогов между соседними различными значениями.
    /// При равной ошибке остаётся первый найденный вариант.
    fn find_best_split(&self, X: &ArrayView2<f64>, y: &ArrayView1<f64>, indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let mut best: Option<BestSplit> = None;
        let mut order = indices.to_vec();

        for feature in 0..X.ncols() {
            order.sort_by(|&a, &b| X[[a, feature]].total_cmp(&X[[b, feature]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for p in 1..n {
                let prev = order[p - 1];
                left_sum += y[prev];
                left_sq += y[prev] * y[prev];

                let lo = X[[prev, feature]];
                let hi = X[[order[p], feature]];
                if lo >= hi {
                    continue;
                }

                let n_left = p as f64;
                let n_right = (n - p) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let score = (left_sq - left_sum * left_sum / n_left) + (right_sq - right_sum * right_sum / n_right);

                if best.as_ref().map_or(true, |b| score < b.score) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }

    pub fn predict(&self, X: ArrayView2<f64>) -> Result<Array1<f64>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| PipelineError::new(ErrorKind::Training, "Model not trained"))?;
        if X.ncols() != self.n_features {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!("Expected {} features, got {}", self.n_features, X.ncols()),
            ));
        }

        Ok(X.rows()
            .into_iter()
            .map(|sample| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value } => break *value,
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if sample[*feature] <= *threshold {
                                left.as_ref()
                            } else {
                                right.as_ref()
                            };
                        }
                    }
                }
            })
            .collect())
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}
