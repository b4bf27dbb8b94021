//! Табличные данные: загрузка и запись CSV
//!
//! Значения хранятся как строки; разбор в числа выполняет препроцессор,
//! потому что тип столбца задаётся конфигурацией ролей.

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use ndarray::Array1;

use crate::error::{ErrorContext, ErrorKind, PipelineError, Result};

/// Маркеры пропущенных значений в CSV
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "<NA>"];

pub fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::new(
                    ErrorKind::DataLoad,
                    format!("Duplicate column '{name}'"),
                ));
            }
        }

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(PipelineError::new(
                ErrorKind::DataLoad,
                format!("Row {} has {} fields, expected {}", i, row.len(), columns.len()),
            ));
        }

        Ok(Self { columns, rows })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .with_context(ErrorKind::DataLoad, || format!("Failed to open {}", path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .with_context(ErrorKind::DataLoad, || format!("Failed to read header of {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(PipelineError::new(
                ErrorKind::DataLoad,
                format!("{} has no header row", path.display()),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .with_context(ErrorKind::DataLoad, || format!("Malformed record in {}", path.display()))?;
            rows.push(
                record
                    .iter()
                    .map(|field| (!is_missing(field)).then(|| field.to_string()))
                    .collect(),
            );
        }

        Self::new(columns, rows)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        crate::artifacts::ensure_parent_dir(path)?;

        let mut writer = WriterBuilder::new()
            .from_path(path)
            .with_context(ErrorKind::Persistence, || format!("Failed to create {}", path.display()))?;
        writer
            .write_record(&self.columns)
            .with_context(ErrorKind::Persistence, || format!("Failed to write {}", path.display()))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))
                .with_context(ErrorKind::Persistence, || format!("Failed to write {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(ErrorKind::Persistence, || format!("Failed to flush {}", path.display()))?;

        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Значения столбца в порядке строк, `None` для пропусков
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    pub fn drop_column(&self, name: &str) -> Result<Table> {
        let idx = self.column_index(name).ok_or_else(|| {
            PipelineError::new(ErrorKind::DataLoad, format!("Column '{name}' not found"))
        })?;

        let mut columns = self.columns.clone();
        columns.remove(idx);
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.remove(idx);
                row
            })
            .collect();

        Ok(Table { columns, rows })
    }

    /// Новая таблица из строк с указанными индексами (в указанном порядке)
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Отделяет целевой столбец: признаки без него и числовой вектор цели
    pub fn split_target(&self, target: &str) -> Result<(Table, Array1<f64>)> {
        let values = self.column(target).ok_or_else(|| {
            PipelineError::new(ErrorKind::DataLoad, format!("Target column '{target}' not found"))
        })?;

        let mut y = Array1::zeros(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let value = value.ok_or_else(|| {
                PipelineError::new(
                    ErrorKind::Transformation,
                    format!("Missing target '{target}' in row {i}"),
                )
            })?;
            y[i] = value.parse::<f64>().with_context(ErrorKind::Transformation, || {
                format!("Target '{target}' in row {i} is not numeric: '{value}'")
            })?;
        }

        Ok((self.drop_column(target)?, y))
    }

    /// Проверяет наличие всех нужных столбцов
    pub fn require_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let missing: Vec<&str> = names.into_iter().filter(|n| !self.has_column(n)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::new(
                ErrorKind::DataLoad,
                format!("Missing columns: {}", missing.join(", ")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_csv(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("sample.csv");
        fs::write(
            &path,
            "gender,reading_score,math_score\nfemale,72,70\nmale, NA ,65\n,90,88\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn loads_csv_with_missing_values() {
        let dir = tempdir().unwrap();
        let table = Table::from_csv_path(sample_csv(dir.path())).unwrap();

        assert_eq!(table.columns(), ["gender", "reading_score", "math_score"]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(
            table.column("reading_score").unwrap(),
            vec![Some("72"), None, Some("90")]
        );
        assert_eq!(table.column("gender").unwrap()[2], None);
    }

    #[test]
    fn split_target_drops_column_and_parses_values() {
        let dir = tempdir().unwrap();
        let table = Table::from_csv_path(sample_csv(dir.path())).unwrap();
        let (features, y) = table.split_target("math_score").unwrap();

        assert_eq!(features.columns(), ["gender", "reading_score"]);
        assert_eq!(y.to_vec(), vec![70.0, 65.0, 88.0]);
    }

    #[test]
    fn missing_file_is_data_load_error() {
        let dir = tempdir().unwrap();
        let err = Table::from_csv_path(dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "a,b\n1,2\n3\n").unwrap();
        let err = Table::from_csv_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.csv");
        fs::write(&path, "a,a\n1,2\n").unwrap();
        let err = Table::from_csv_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
        assert!(err.message().contains("Duplicate column 'a'"));
    }

    #[test]
    fn missing_target_column_is_data_load_error() {
        let table = Table::new(vec!["a".to_string()], vec![vec![Some("1".to_string())]]).unwrap();
        let err = table.split_target("math_score").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
    }

    #[test]
    fn write_then_read_keeps_rows() {
        let dir = tempdir().unwrap();
        let table = Table::from_csv_path(sample_csv(dir.path())).unwrap();
        let out = dir.path().join("nested").join("copy.csv");
        table.write_csv(&out).unwrap();

        let reloaded = Table::from_csv_path(&out).unwrap();
        assert_eq!(reloaded, table);
    }
}
