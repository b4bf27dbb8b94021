//! Конфигурация пайплайна
//!
//! Все поля имеют значения по умолчанию, поэтому JSON-файл может задавать
//! только то, что нужно переопределить.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, ErrorKind, PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: ColumnRoles,
    pub artifacts: ArtifactPaths,
    pub ingestion: IngestionConfig,
    pub training: TrainingConfig,
    pub unknown_category: UnknownCategory,
}

/// Разбиение столбцов по ролям. Порядок столбцов определяет порядок
/// признаков в выходной матрице.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub raw_data: PathBuf,
    pub train_data: PathBuf,
    pub test_data: PathBuf,
    pub preprocessor: PathBuf,
    pub model: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub source: PathBuf,
    pub test_size: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Минимальный R² лучшей модели
    pub quality_threshold: f64,
    pub seed: u64,
}

/// Что делать с категорией, которой не было в обучающих данных
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    /// Нулевой one-hot блок и предупреждение в лог
    #[default]
    Ignore,
    Error,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            numerical: vec!["writing_score".to_string(), "reading_score".to_string()],
            categorical: vec![
                "gender".to_string(),
                "race_ethnicity".to_string(),
                "parental_level_of_education".to_string(),
                "lunch".to_string(),
                "test_preparation_course".to_string(),
            ],
            target: "math_score".to_string(),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir("artifacts")
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("notebook").join("data").join("stud.csv"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 0.6,
            seed: 42,
        }
    }
}

impl ColumnRoles {
    /// Все столбцы признаков: сначала числовые, затем категориальные
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.numerical
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
    }

    pub fn validate(&self) -> Result<()> {
        if self.numerical.is_empty() && self.categorical.is_empty() {
            return Err(PipelineError::new(ErrorKind::Config, "No feature columns configured"));
        }

        let mut seen = std::collections::HashSet::new();
        for name in self.feature_columns() {
            if !seen.insert(name) {
                return Err(PipelineError::new(
                    ErrorKind::Config,
                    format!("Column '{name}' is assigned to more than one role"),
                ));
            }
        }
        if seen.contains(self.target.as_str()) {
            return Err(PipelineError::new(
                ErrorKind::Config,
                format!("Target column '{}' is also listed as a feature", self.target),
            ));
        }

        Ok(())
    }
}

impl ArtifactPaths {
    /// Стандартный набор имён файлов внутри каталога `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            raw_data: dir.join("data.csv"),
            train_data: dir.join("train.csv"),
            test_data: dir.join("test.csv"),
            preprocessor: dir.join("preprocessor.json"),
            model: dir.join("model.json"),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(ErrorKind::Config, || format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(ErrorKind::Config, || format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;

        if !(self.ingestion.test_size > 0.0 && self.ingestion.test_size < 1.0) {
            return Err(PipelineError::new(
                ErrorKind::Config,
                format!("test_size must be in (0, 1), got {}", self.ingestion.test_size),
            ));
        }
        if !self.training.quality_threshold.is_finite() {
            return Err(PipelineError::new(ErrorKind::Config, "quality_threshold must be finite"));
        }

        Ok(())
    }
}
