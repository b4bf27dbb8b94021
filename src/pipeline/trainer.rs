//! Стадия обучения: перебор кандидатов и выбор лучшего по R² на test

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use linfa::prelude::SingleTargetRegression;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::artifacts::{load_object, save_object};
use crate::config::PipelineConfig;
use crate::error::{log_failure, ErrorContext, ErrorKind, PipelineError, Result};
use crate::models::{Model, ModelRegistry};

/// Сохранённая лучшая модель
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub score: f64,
    pub trained_at: DateTime<Utc>,
    pub model: serde_json::Value,
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_object(path)
    }

    /// Восстанавливает встроенную модель из артефакта
    pub fn to_model(&self) -> Result<Model> {
        serde_json::from_value(self.model.clone()).with_context(ErrorKind::Persistence, || {
            format!("Artifact '{}' does not hold a built-in model", self.name)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub name: String,
    pub score: f64,
}

/// Оценки кандидатов в порядке регистрации
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReport {
    pub scores: Vec<ModelScore>,
}

impl ModelReport {
    /// Первый кандидат со строго наибольшей оценкой; NaN не выбирается
    pub fn best(&self) -> Option<&ModelScore> {
        let mut best: Option<&ModelScore> = None;
        for entry in &self.scores {
            if entry.score.is_nan() {
                continue;
            }
            if best.map_or(true, |b| entry.score > b.score) {
                best = Some(entry);
            }
        }
        best
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.name == name).map(|s| s.score)
    }
}

pub struct ModelTrainer {
    registry: ModelRegistry,
    quality_threshold: f64,
    model_path: PathBuf,
}

impl ModelTrainer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            registry: ModelRegistry::with_default_candidates(config.training.seed),
            quality_threshold: config.training.quality_threshold,
            model_path: config.artifacts.model.clone(),
        }
    }

    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Возвращает R² лучшей модели на test
    pub fn run(&mut self, train: &Array2<f64>, test: &Array2<f64>) -> Result<f64> {
        self.train_and_select(train, test)
            .inspect_err(|err| log_failure("model_trainer", err))
    }

    fn train_and_select(&mut self, train: &Array2<f64>, test: &Array2<f64>) -> Result<f64> {
        let report = self.evaluate_models(train, test)?;

        let best = report.best().ok_or_else(|| {
            PipelineError::new(ErrorKind::InsufficientModelQuality, "No best model found")
        })?;
        if best.score < self.quality_threshold {
            return Err(PipelineError::new(
                ErrorKind::InsufficientModelQuality,
                format!(
                    "No best model found: '{}' scored {:.4}, below threshold {}",
                    best.name, best.score, self.quality_threshold
                ),
            ));
        }
        tracing::info!(model = %best.name, r2 = best.score, "Best model found on both training and testing dataset");

        let candidate = self.registry.get(&best.name).ok_or_else(|| {
            PipelineError::new(ErrorKind::Training, format!("Model '{}' left the registry", best.name))
        })?;
        let artifact = ModelArtifact {
            name: best.name.clone(),
            score: best.score,
            trained_at: Utc::now(),
            model: candidate.model().to_artifact()?,
        };
        save_object(&self.model_path, &artifact)?;
        tracing::info!(path = %self.model_path.display(), "Saved best model");

        Ok(best.score)
    }

    /// Обучает каждого кандидата на train и оценивает на test
    pub fn evaluate_models(&mut self, train: &Array2<f64>, test: &Array2<f64>) -> Result<ModelReport> {
        tracing::info!("Splitting training and test input data");
        let (x_train, y_train) = split_features_target(train)?;
        let (x_test, y_test) = split_features_target(test)?;
        if x_train.ncols() != x_test.ncols() {
            return Err(PipelineError::new(
                ErrorKind::Transformation,
                format!("Train has {} feature columns but test has {}", x_train.ncols(), x_test.ncols()),
            ));
        }

        let mut report = ModelReport::default();
        for candidate in self.registry.iter_mut() {
            let name = candidate.name().to_string();
            let model = candidate.model_mut();
            model.fit(x_train, y_train)?;
            let predicted = model.predict(x_test)?;
            let score = r2_score(y_test, &predicted)?;

            tracing::info!(model = %name, r2 = score, "Model evaluated");
            report.scores.push(ModelScore { name, score });
        }

        Ok(report)
    }
}

/// Признаки: все столбцы, кроме последнего; цель: последний столбец
pub fn split_features_target(matrix: &Array2<f64>) -> Result<(ArrayView2<'_, f64>, ArrayView1<'_, f64>)> {
    let n_cols = matrix.ncols();
    if n_cols < 2 {
        return Err(PipelineError::new(
            ErrorKind::Transformation,
            format!("Expected at least one feature and a target column, got {n_cols} columns"),
        ));
    }

    Ok((matrix.slice(s![.., ..n_cols - 1]), matrix.column(n_cols - 1)))
}

/// Коэффициент детерминации.
///
/// linfa добавляет 1e-10 к знаменателю, поэтому результат может отличаться
/// от точного значения в последних знаках. Для постоянной цели знаменатель
/// равен нулю: 1.0 при точном совпадении, иначе 0.0.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.is_empty() {
        return Err(PipelineError::new(ErrorKind::Training, "Cannot score an empty test set"));
    }
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::new(
            ErrorKind::Training,
            format!("{} targets but {} predictions", y_true.len(), y_pred.len()),
        ));
    }

    let first = y_true[0];
    if y_true.iter().all(|&v| v == first) {
        let exact = y_true.iter().zip(y_pred.iter()).all(|(t, p)| t == p);
        return Ok(if exact { 1.0 } else { 0.0 });
    }

    y_pred
        .r2(&y_true)
        .context(ErrorKind::Training, "Failed to compute R2 score")
}
