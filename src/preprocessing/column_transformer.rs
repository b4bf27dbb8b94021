//! Препроцессор по столбцам
//!
//! Числовая ветка: медиана -> стандартизация.
//! Категориальная ветка: мода -> one-hot.
//! Столбцы, не попавшие ни в одну роль, в выход не попадают.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::{ColumnRoles, UnknownCategory};
use crate::dataset::Table;
use crate::error::{ErrorContext, ErrorKind, PipelineError, Result};
use crate::preprocessing::encoding::{Encoded, OneHotEncoder};
use crate::preprocessing::imputer::{MedianImputer, MostFrequentImputer};
use crate::preprocessing::normalization::StandardScaler;

pub struct PreprocessorBuilder {
    roles: ColumnRoles,
    handle_unknown: UnknownCategory,
}

impl PreprocessorBuilder {
    pub fn new(roles: ColumnRoles) -> Self {
        Self {
            roles,
            handle_unknown: UnknownCategory::default(),
        }
    }

    pub fn handle_unknown(mut self, policy: UnknownCategory) -> Self {
        self.handle_unknown = policy;
        self
    }

    pub fn build(&self) -> Preprocessor {
        Preprocessor {
            numerical: self.roles.numerical.clone(),
            categorical: self.roles.categorical.clone(),
            handle_unknown: self.handle_unknown,
        }
    }
}

/// План преобразования, ещё не обученный
#[derive(Debug, Clone)]
pub struct Preprocessor {
    numerical: Vec<String>,
    categorical: Vec<String>,
    handle_unknown: UnknownCategory,
}

impl Preprocessor {
    pub fn numerical_columns(&self) -> &[String] {
        &self.numerical
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical
    }

    /// Обучение только на признаках обучающей выборки
    pub fn fit(&self, features: &Table) -> Result<FittedPreprocessor> {
        if features.is_empty() {
            return Err(PipelineError::new(ErrorKind::Transformation, "Cannot fit on an empty table"));
        }

        let raw_numeric = numeric_columns(features, &self.numerical)?;
        let numeric_imputer = MedianImputer::fit(&self.numerical, &raw_numeric)?;
        let imputed = impute_numeric(&numeric_imputer, &raw_numeric, features.n_rows());
        let scaler = StandardScaler::fit(&imputed)?;

        let raw_categorical = categorical_columns(features, &self.categorical)?;
        let categorical_imputer = MostFrequentImputer::fit(&self.categorical, &raw_categorical)?;
        let filled: Vec<Vec<&str>> = raw_categorical
            .iter()
            .enumerate()
            .map(|(j, values)| {
                values
                    .iter()
                    .map(|v| categorical_imputer.fill(j, *v))
                    .collect()
            })
            .collect();
        let encoder = OneHotEncoder::fit(&filled, self.handle_unknown);

        let fitted = FittedPreprocessor {
            numerical: self.numerical.clone(),
            categorical: self.categorical.clone(),
            numeric_imputer,
            scaler,
            categorical_imputer,
            encoder,
        };
        tracing::info!(
            numerical = fitted.numerical.len(),
            one_hot_width = fitted.encoder.n_outputs(),
            "Preprocessor fitted"
        );

        Ok(fitted)
    }

    pub fn fit_transform(&self, features: &Table) -> Result<(FittedPreprocessor, Array2<f64>)> {
        let fitted = self.fit(features)?;
        let transformed = fitted.transform(features)?;
        Ok((fitted, transformed))
    }
}

/// Обученный препроцессор. Применение не изменяет выученное состояние.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    numerical: Vec<String>,
    categorical: Vec<String>,
    numeric_imputer: MedianImputer,
    scaler: StandardScaler,
    categorical_imputer: MostFrequentImputer,
    encoder: OneHotEncoder,
}

impl FittedPreprocessor {
    pub fn n_features_out(&self) -> usize {
        self.numerical.len() + self.encoder.n_outputs()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numerical.clone();
        names.extend(self.encoder.feature_names(&self.categorical));
        names
    }

    pub fn numeric_imputer(&self) -> &MedianImputer {
        &self.numeric_imputer
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn categorical_imputer(&self) -> &MostFrequentImputer {
        &self.categorical_imputer
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn transform(&self, features: &Table) -> Result<Array2<f64>> {
        let n_rows = features.n_rows();
        let n_numeric = self.numerical.len();
        let mut out = Array2::zeros((n_rows, self.n_features_out()));

        if n_numeric > 0 {
            let raw_numeric = numeric_columns(features, &self.numerical)?;
            let imputed = impute_numeric(&self.numeric_imputer, &raw_numeric, n_rows);
            let scaled = self.scaler.transform(&imputed)?;
            out.slice_mut(ndarray::s![.., ..n_numeric]).assign(&scaled);
        }

        let raw_categorical = categorical_columns(features, &self.categorical)?;
        let mut unknown = 0usize;
        for (j, values) in raw_categorical.iter().enumerate() {
            let offset = n_numeric + self.encoder.block_offset(j);
            for (i, value) in values.iter().enumerate() {
                let value = self.categorical_imputer.fill(j, *value);
                match self.encoder.encode(j, &self.categorical[j], value)? {
                    Encoded::Known(idx) => out[[i, offset + idx]] = 1.0,
                    Encoded::Unknown => unknown += 1,
                }
            }
        }
        if unknown > 0 {
            tracing::warn!(count = unknown, "Unknown categories encoded as all-zero blocks");
        }

        Ok(out)
    }
}

fn numeric_columns(table: &Table, names: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
    names
        .iter()
        .map(|name| -> Result<Vec<Option<f64>>> {
            let values = table.column(name).ok_or_else(|| {
                PipelineError::new(ErrorKind::Transformation, format!("Column '{name}' not found"))
            })?;
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    v.map(|text| {
                        text.parse::<f64>().with_context(ErrorKind::Transformation, || {
                            format!("Column '{name}' row {i}: '{text}' is not numeric")
                        })
                    })
                    .transpose()
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

fn categorical_columns<'t>(table: &'t Table, names: &[String]) -> Result<Vec<Vec<Option<&'t str>>>> {
    names
        .iter()
        .map(|name| {
            table.column(name).ok_or_else(|| {
                PipelineError::new(ErrorKind::Transformation, format!("Column '{name}' not found"))
            })
        })
        .collect()
}

fn impute_numeric(imputer: &MedianImputer, columns: &[Vec<Option<f64>>], n_rows: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| imputer.fill(j, columns[j][i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[&str; 3]]) -> Table {
        Table::new(
            vec!["score".to_string(), "lunch".to_string(), "school".to_string()],
            rows.iter()
                .map(|r| {
                    r.iter()
                        .map(|v| (!crate::dataset::is_missing(v)).then(|| v.to_string()))
                        .collect()
                })
                .collect(),
        )
        .unwrap()
    }

    fn builder() -> PreprocessorBuilder {
        PreprocessorBuilder::new(ColumnRoles {
            numerical: vec!["score".to_string()],
            categorical: vec!["lunch".to_string()],
            target: "math_score".to_string(),
        })
    }

    #[test]
    fn imputes_scales_and_encodes() {
        let train = table(&[
            ["1", "standard", "a"],
            ["", "free", "b"],
            ["3", "", "c"],
            ["5", "standard", "d"],
        ]);
        let (fitted, x) = builder().build().fit_transform(&train).unwrap();

        // Медиана 3, столбец "school" отброшен
        assert_eq!(fitted.numeric_imputer().statistics(), &[3.0]);
        assert_eq!(fitted.feature_names(), vec!["score", "lunch_free", "lunch_standard"]);
        assert_eq!(x.dim(), (4, 3));
        assert!((x.column(0).sum()).abs() < 1e-12);
        // Пропуск в "lunch" заполнен модой "standard"
        assert_eq!(x.row(2).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn transform_does_not_change_fitted_state() {
        let train = table(&[["1", "standard", "a"], ["2", "free", "b"]]);
        let test = table(&[["100", "other", "a"], ["", "free", "b"]]);
        let fitted = builder().build().fit(&train).unwrap();
        let before = serde_json::to_string(&fitted).unwrap();

        let first = fitted.transform(&test).unwrap();
        let second = fitted.transform(&test).unwrap();

        assert_eq!(serde_json::to_string(&fitted).unwrap(), before);
        assert_eq!(first, second);
        // Неизвестная категория даёт нулевой блок
        assert_eq!((first[[0, 1]], first[[0, 2]]), (0.0, 0.0));
    }

    #[test]
    fn strict_policy_rejects_unknown_category() {
        let train = table(&[["1", "standard", "a"], ["2", "free", "b"]]);
        let test = table(&[["1", "other", "a"]]);
        let fitted = builder()
            .handle_unknown(UnknownCategory::Error)
            .build()
            .fit(&train)
            .unwrap();

        let err = fitted.transform(&test).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transformation);
    }

    #[test]
    fn non_numeric_value_is_transformation_error() {
        let train = table(&[["high", "standard", "a"]]);
        let err = builder().build().fit(&train).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transformation);
    }
}
