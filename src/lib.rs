//! Student Performance - конвейер регрессии оценки по математике

pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use types::*;
pub use models::{Model, ModelRegistry, Regressor};
pub use preprocessing::{FittedPreprocessor, Preprocessor, PreprocessorBuilder};

// Re-export для удобства
pub use config::PipelineConfig;
pub use dataset::Table;
pub use error::{ErrorKind, PipelineError, Result};
pub use pipeline::{DataIngestion, DataTransformation, ModelTrainer, PredictPipeline};
