//! Предсказание по сохранённым артефактам

use std::path::Path;

use ndarray::Array1;

use crate::artifacts::load_object;
use crate::config::ArtifactPaths;
use crate::dataset::Table;
use crate::error::{log_failure, Result};
use crate::models::{Model, Regressor};
use crate::pipeline::trainer::ModelArtifact;
use crate::preprocessing::FittedPreprocessor;
use crate::types::StudentRecord;

pub struct PredictPipeline {
    preprocessor: FittedPreprocessor,
    model_name: String,
    model: Model,
}

impl PredictPipeline {
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        Self::from_files(&paths.preprocessor, &paths.model)
    }

    pub fn from_files(preprocessor_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self> {
        let load = || -> Result<Self> {
            let preprocessor: FittedPreprocessor = load_object(preprocessor_path.as_ref())?;
            let artifact = ModelArtifact::load(model_path.as_ref())?;
            let model = artifact.to_model()?;
            tracing::info!(model = %artifact.name, "Loaded preprocessor and model");
            Ok(Self {
                preprocessor,
                model_name: artifact.name,
                model,
            })
        };
        load().inspect_err(|err| log_failure("predict_pipeline", err))
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Столбец цели, если он есть, игнорируется
    pub fn predict(&self, features: &Table) -> Result<Array1<f64>> {
        let run = || -> Result<Array1<f64>> {
            let x = self.preprocessor.transform(features)?;
            self.model.predict(x.view())
        };
        run().inspect_err(|err| log_failure("predict_pipeline", err))
    }

    pub fn predict_records(&self, records: &[StudentRecord]) -> Result<Array1<f64>> {
        self.predict(&StudentRecord::records_to_table(records)?)
    }
}
