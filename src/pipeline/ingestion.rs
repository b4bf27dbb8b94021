//! Подготовка данных: копия исходного CSV и разбиение на train/test

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::PipelineConfig;
use crate::dataset::Table;
use crate::error::{log_failure, ErrorKind, PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionOutput {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

pub struct DataIngestion {
    config: PipelineConfig,
}

impl DataIngestion {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Читает исходный файл из конфигурации
    pub fn run(&self) -> Result<IngestionOutput> {
        self.run_from(&self.config.ingestion.source)
    }

    pub fn run_from(&self, source: impl AsRef<Path>) -> Result<IngestionOutput> {
        self.ingest(source.as_ref())
            .inspect_err(|err| log_failure("data_ingestion", err))
    }

    fn ingest(&self, source: &Path) -> Result<IngestionOutput> {
        tracing::info!(source = %source.display(), "Entered the data ingestion component");
        let df = Table::from_csv_path(source)?;
        if df.n_rows() < 2 {
            return Err(PipelineError::new(
                ErrorKind::DataLoad,
                format!("{} needs at least 2 rows to split, got {}", source.display(), df.n_rows()),
            ));
        }

        let artifacts = &self.config.artifacts;
        df.write_csv(&artifacts.raw_data)?;

        let (train_idx, test_idx) = split_indices(
            df.n_rows(),
            self.config.ingestion.test_size,
            self.config.ingestion.seed,
        );
        df.select_rows(&train_idx).write_csv(&artifacts.train_data)?;
        df.select_rows(&test_idx).write_csv(&artifacts.test_data)?;
        tracing::info!(
            train_rows = train_idx.len(),
            test_rows = test_idx.len(),
            "Ingestion of the data is completed"
        );

        Ok(IngestionOutput {
            train_path: artifacts.train_data.clone(),
            test_path: artifacts.test_data.clone(),
        })
    }
}

/// Перемешивание с фиксированным seed; в test попадает ceil(n * test_size)
/// строк, но хотя бы одна строка остаётся в каждой части
fn split_indices(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_test = n_test.clamp(1, n - 1);
    let test = indices.split_off(n - n_test);
    (indices, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactPaths;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn split_is_seeded_and_disjoint() {
        let (train, test) = split_indices(10, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 10);
        assert_eq!(split_indices(10, 0.2, 42), (train, test));
    }

    #[test]
    fn writes_raw_train_and_test_files() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("stud.csv");
        let mut text = String::from("gender,math_score\n");
        for i in 0..10 {
            text.push_str(&format!("{},{}\n", if i % 2 == 0 { "female" } else { "male" }, 50 + i));
        }
        fs::write(&source, text).unwrap();

        let config = PipelineConfig {
            artifacts: ArtifactPaths::in_dir(dir.path().join("artifacts")),
            ..PipelineConfig::default()
        };
        let out = DataIngestion::new(config.clone()).run_from(&source).unwrap();

        assert_eq!(Table::from_csv_path(&config.artifacts.raw_data).unwrap().n_rows(), 10);
        assert_eq!(Table::from_csv_path(&out.train_path).unwrap().n_rows(), 8);
        assert_eq!(Table::from_csv_path(&out.test_path).unwrap().n_rows(), 2);
    }

    #[test]
    fn single_row_source_is_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("stud.csv");
        fs::write(&source, "gender,math_score\nfemale,50\n").unwrap();

        let config = PipelineConfig {
            artifacts: ArtifactPaths::in_dir(dir.path().join("artifacts")),
            ..PipelineConfig::default()
        };
        let err = DataIngestion::new(config).run_from(&source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
    }
}
