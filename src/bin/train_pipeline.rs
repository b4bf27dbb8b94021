/// Полный конвейер обучения: подготовка данных, преобразование, выбор модели

use anyhow::Context;

use student_performance::{logging, DataIngestion, DataTransformation, ModelTrainer, PipelineConfig};

fn main() -> anyhow::Result<()> {
    logging::init("logs").context("Failed to initialize logging")?;

    let config = PipelineConfig::default();
    config.validate()?;

    let ingested = DataIngestion::new(config.clone()).run()?;
    let transformed = DataTransformation::new(config.clone()).run(&ingested.train_path, &ingested.test_path)?;

    let mut trainer = ModelTrainer::new(&config);
    let score = trainer.run(&transformed.train, &transformed.test)?;

    println!("R2 Score: {score}");
    Ok(())
}
