use std::fs;
use std::path::{Path, PathBuf};

use student_performance::config::ArtifactPaths;
use student_performance::pipeline::trainer::{r2_score, split_features_target};
use student_performance::{
    DataIngestion, DataTransformation, ErrorKind, ModelTrainer, PipelineConfig, PredictPipeline, Table,
};
use tempfile::tempdir;

const HEADER: &str = "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score";

const GROUPS: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
const EDUCATION: [&str; 6] = [
    "some high school",
    "high school",
    "some college",
    "associate's degree",
    "bachelor's degree",
    "master's degree",
];

/// Детерминированная строка: оценка по математике почти линейна по чтению и письму
fn student_row(i: usize) -> String {
    let gender = if i % 2 == 0 { "female" } else { "male" };
    let standard_lunch = (i / 3) % 2 == 0;
    let lunch = if standard_lunch { "standard" } else { "free/reduced" };
    let prep = if (i / 7) % 2 == 0 { "none" } else { "completed" };

    let reading = 30 + (i * 37) % 61;
    let writing = reading + (i * 13) % 7;
    let noise = ((i * 7) % 5) as f64 - 2.0;
    let bonus = if standard_lunch { 5.0 } else { 0.0 };
    let math = 0.6 * reading as f64 + 0.4 * writing as f64 + bonus + noise;

    format!(
        "{gender},{},{},{lunch},{prep},{math},{reading},{writing}",
        GROUPS[i % 5],
        EDUCATION[i % 6],
    )
}

fn write_rows(path: &Path, rows: impl Iterator<Item = usize>) -> PathBuf {
    let mut text = String::from(HEADER);
    for i in rows {
        text.push('\n');
        text.push_str(&student_row(i));
    }
    fs::write(path, text).unwrap();
    path.to_path_buf()
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        artifacts: ArtifactPaths::in_dir(dir.join("artifacts")),
        ..PipelineConfig::default()
    }
}

#[test]
fn transformation_produces_matrices_with_target_last() {
    let dir = tempdir().unwrap();
    let train = write_rows(&dir.path().join("train.csv"), 0..100);
    let test = write_rows(&dir.path().join("test.csv"), 100..120);

    let output = DataTransformation::new(config(dir.path())).run(&train, &test).unwrap();

    // 2 числовых + (2 + 5 + 6 + 2 + 2) one-hot + цель
    assert_eq!(output.train.dim(), (100, 20));
    assert_eq!(output.test.dim(), (20, 20));
    assert!(output.preprocessor_path.exists());

    let raw_test = Table::from_csv_path(&test).unwrap();
    let (_, target) = raw_test.split_target("math_score").unwrap();
    assert_eq!(output.test.column(19).to_vec(), target.to_vec());
}

#[test]
fn training_selects_model_and_prediction_reproduces_score() {
    let dir = tempdir().unwrap();
    let train = write_rows(&dir.path().join("train.csv"), 0..100);
    let test = write_rows(&dir.path().join("test.csv"), 100..120);
    let config = config(dir.path());

    let output = DataTransformation::new(config.clone()).run(&train, &test).unwrap();
    let mut trainer = ModelTrainer::new(&config);
    let score = trainer.run(&output.train, &output.test).unwrap();
    assert!(score > 0.6, "{score}");
    assert!(config.artifacts.model.exists());

    let pipeline = PredictPipeline::load(&config.artifacts).unwrap();
    let raw_test = Table::from_csv_path(&test).unwrap();
    let predicted = pipeline.predict(&raw_test).unwrap();

    let (_, y_test) = split_features_target(&output.test).unwrap();
    let replayed = r2_score(y_test, &predicted).unwrap();
    assert!((replayed - score).abs() < 1e-6, "{replayed} vs {score}");
}

#[test]
fn full_chain_from_raw_csv() {
    let dir = tempdir().unwrap();
    let source = write_rows(&dir.path().join("stud.csv"), 0..120);
    let config = config(dir.path());

    let ingested = DataIngestion::new(config.clone()).run_from(&source).unwrap();
    let output = DataTransformation::new(config.clone())
        .run(&ingested.train_path, &ingested.test_path)
        .unwrap();
    assert_eq!(output.train.nrows(), 96);
    assert_eq!(output.test.nrows(), 24);

    let score = ModelTrainer::new(&config).run(&output.train, &output.test).unwrap();
    assert!(score > 0.6, "{score}");
}

#[test]
fn unreachable_threshold_persists_nothing() {
    let dir = tempdir().unwrap();
    let train = write_rows(&dir.path().join("train.csv"), 0..100);
    let test = write_rows(&dir.path().join("test.csv"), 100..120);
    let mut config = config(dir.path());
    config.training.quality_threshold = 1.5;

    let output = DataTransformation::new(config.clone()).run(&train, &test).unwrap();
    let err = ModelTrainer::new(&config).run(&output.train, &output.test).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientModelQuality);
    assert!(!config.artifacts.model.exists());
}
