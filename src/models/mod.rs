//! Модели регрессии и реестр кандидатов

pub mod forest;
pub mod linear;
pub mod neighbors;
pub mod tree;

pub use forest::RandomForestRegressor;
pub use linear::LinearRegression;
pub use neighbors::KNeighborsRegressor;
pub use tree::DecisionTreeRegressor;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, ErrorKind, PipelineError, Result};

/// Обучаемый алгоритм регрессии
pub trait Regressor {
    fn fit(&mut self, records: ArrayView2<f64>, targets: ArrayView1<f64>) -> Result<()>;

    fn predict(&self, records: ArrayView2<f64>) -> Result<Array1<f64>>;

    /// Параметры модели для сохранения в артефакт
    fn to_artifact(&self) -> Result<serde_json::Value>;
}

/// Встроенные алгоритмы. Сериализуется с тегом `algorithm`, поэтому
/// сохранённую модель можно загрузить обратно.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Model {
    RandomForest(RandomForestRegressor),
    DecisionTree(DecisionTreeRegressor),
    LinearRegression(LinearRegression),
    KNeighbors(KNeighborsRegressor),
}

impl Regressor for Model {
    fn fit(&mut self, records: ArrayView2<f64>, targets: ArrayView1<f64>) -> Result<()> {
        if records.nrows() != targets.len() {
            return Err(PipelineError::new(
                ErrorKind::Training,
                format!("{} rows but {} targets", records.nrows(), targets.len()),
            ));
        }

        match self {
            Model::RandomForest(m) => m.fit(records, targets),
            Model::DecisionTree(m) => m.fit(records, targets),
            Model::LinearRegression(m) => m.fit(records, targets),
            Model::KNeighbors(m) => m.fit(records, targets),
        }
    }

    fn predict(&self, records: ArrayView2<f64>) -> Result<Array1<f64>> {
        match self {
            Model::RandomForest(m) => m.predict(records),
            Model::DecisionTree(m) => m.predict(records),
            Model::LinearRegression(m) => m.predict(records),
            Model::KNeighbors(m) => m.predict(records),
        }
    }

    fn to_artifact(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).context(ErrorKind::Persistence, "Failed to serialize model")
    }
}

pub struct Candidate {
    name: String,
    model: Box<dyn Regressor>,
}

impl Candidate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> &mut dyn Regressor {
        self.model.as_mut()
    }
}

/// Упорядоченный набор кандидатов. Порядок регистрации определяет
/// победителя при равных оценках.
#[derive(Default)]
pub struct ModelRegistry {
    candidates: Vec<Candidate>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Фиксированный набор моделей с параметрами по умолчанию
    pub fn with_default_candidates(seed: u64) -> Self {
        let defaults = [
            ("Random Forest", Model::RandomForest(RandomForestRegressor::new(seed))),
            ("Decision Tree", Model::DecisionTree(DecisionTreeRegressor::new())),
            ("Linear Regression", Model::LinearRegression(LinearRegression::new())),
            ("K-Neighbors Regressor", Model::KNeighbors(KNeighborsRegressor::default())),
        ];

        Self {
            candidates: defaults
                .into_iter()
                .map(|(name, model)| Candidate {
                    name: name.to_string(),
                    model: Box::new(model),
                })
                .collect(),
        }
    }

    pub fn register<R: Regressor + 'static>(&mut self, name: impl Into<String>, model: R) -> Result<()> {
        let name = name.into();
        if self.candidates.iter().any(|c| c.name == name) {
            return Err(PipelineError::new(
                ErrorKind::Config,
                format!("Model '{name}' is already registered"),
            ));
        }

        self.candidates.push(Candidate {
            name,
            model: Box::new(model),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.name == name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Candidate> {
        self.candidates.iter_mut()
    }
}
