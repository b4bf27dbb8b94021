//! Стадии конвейера: подготовка данных, преобразование, обучение, предсказание

pub mod ingestion;
pub mod predict;
pub mod trainer;
pub mod transformation;

pub use ingestion::{DataIngestion, IngestionOutput};
pub use predict::PredictPipeline;
pub use trainer::{ModelArtifact, ModelReport, ModelScore, ModelTrainer};
pub use transformation::{DataTransformation, TransformationOutput};
