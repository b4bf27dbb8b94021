/// Стадия преобразования данных как отдельная программа

use anyhow::Context;

use student_performance::{logging, DataTransformation, PipelineConfig};

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    logging::init("logs").context("Failed to initialize logging")?;

    let config = PipelineConfig::default();
    config.validate()?;
    let train_path = config.artifacts.train_data.clone();
    let test_path = config.artifacts.test_data.clone();

    let output = DataTransformation::new(config).run(&train_path, &test_path)?;

    println!("Preprocessor Path: {}", output.preprocessor_path.display());
    println!("Train Array Shape: {:?}", output.train.dim());
    println!("Test Array Shape: {:?}", output.test.dim());
    Ok(())
}
