//! Стадия преобразования данных
//!
//! Читает train/test, обучает препроцессор только на train, применяет его
//! к обеим выборкам, добавляет цель последним столбцом и сохраняет
//! обученный препроцессор.

use std::path::{Path, PathBuf};

use ndarray::{concatenate, Array1, Array2, Axis};

use crate::artifacts::save_object;
use crate::config::PipelineConfig;
use crate::dataset::Table;
use crate::error::{log_failure, ErrorContext, ErrorKind, PipelineError, Result};
use crate::preprocessing::{FittedPreprocessor, Preprocessor, PreprocessorBuilder};

#[derive(Debug, Clone)]
pub struct TransformationOutput {
    /// Признаки train и цель в последнем столбце
    pub train: Array2<f64>,
    /// Признаки test и цель в последнем столбце
    pub test: Array2<f64>,
    pub preprocessor_path: PathBuf,
}

pub struct DataTransformation {
    config: PipelineConfig,
}

impl DataTransformation {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn preprocessor(&self) -> Preprocessor {
        PreprocessorBuilder::new(self.config.columns.clone())
            .handle_unknown(self.config.unknown_category)
            .build()
    }

    pub fn run(&self, train_path: impl AsRef<Path>, test_path: impl AsRef<Path>) -> Result<TransformationOutput> {
        self.transform(train_path.as_ref(), test_path.as_ref())
            .inspect_err(|err| log_failure("data_transformation", err))
    }

    fn transform(&self, train_path: &Path, test_path: &Path) -> Result<TransformationOutput> {
        let train_df = self.load(train_path)?;
        let test_df = self.load(test_path)?;
        tracing::info!(
            train_rows = train_df.n_rows(),
            test_rows = test_df.n_rows(),
            "Read train & test data completed"
        );

        let target = self.config.columns.target.as_str();
        let (train_features, train_target) = train_df.split_target(target)?;
        let (test_features, test_target) = test_df.split_target(target)?;

        tracing::info!("Obtaining preprocessing object");
        let preprocessor = self.preprocessor();

        tracing::info!("Applying preprocessing object on training and testing dataframe");
        let (fitted, train_arr) = preprocessor.fit_transform(&train_features)?;
        let test_arr = fitted.transform(&test_features)?;

        let train = attach_target(train_arr, &train_target)?;
        let test = attach_target(test_arr, &test_target)?;
        if train.ncols() != test.ncols() {
            return Err(PipelineError::new(
                ErrorKind::Transformation,
                format!("Train has {} columns but test has {}", train.ncols(), test.ncols()),
            ));
        }

        let preprocessor_path = self.config.artifacts.preprocessor.clone();
        self.save_preprocessor(&fitted, &preprocessor_path)?;
        tracing::info!(path = %preprocessor_path.display(), "Saved preprocessing object");

        Ok(TransformationOutput {
            train,
            test,
            preprocessor_path,
        })
    }

    /// Загрузка CSV с проверкой схемы
    fn load(&self, path: &Path) -> Result<Table> {
        let table = Table::from_csv_path(path)?;
        let columns = &self.config.columns;
        table.require_columns(columns.feature_columns().chain([columns.target.as_str()]))?;
        Ok(table)
    }

    fn save_preprocessor(&self, fitted: &FittedPreprocessor, path: &Path) -> Result<()> {
        save_object(path, fitted)
    }
}

fn attach_target(features: Array2<f64>, target: &Array1<f64>) -> Result<Array2<f64>> {
    let target = target.view().insert_axis(Axis(1));
    concatenate(Axis(1), &[features.view(), target])
        .context(ErrorKind::Transformation, "Failed to attach target column")
}
