//! Заполнение пропусков: медиана для чисел, мода для категорий

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    statistics: Vec<f64>,
}

impl MedianImputer {
    /// `columns[j]` содержит значения j-го столбца
    pub fn fit(names: &[String], columns: &[Vec<Option<f64>>]) -> Result<Self> {
        let statistics = names
            .iter()
            .zip(columns)
            .map(|(name, values)| {
                median(values).ok_or_else(|| {
                    PipelineError::new(
                        ErrorKind::Transformation,
                        format!("Column '{name}' has no values to compute a median"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { statistics })
    }

    pub fn fill(&self, column: usize, value: Option<f64>) -> f64 {
        value.unwrap_or(self.statistics[column])
    }

    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    statistics: Vec<String>,
}

impl MostFrequentImputer {
    pub fn fit(names: &[String], columns: &[Vec<Option<&str>>]) -> Result<Self> {
        let statistics = names
            .iter()
            .zip(columns)
            .map(|(name, values)| {
                most_frequent(values).ok_or_else(|| {
                    PipelineError::new(
                        ErrorKind::Transformation,
                        format!("Column '{name}' has no values to compute a mode"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { statistics })
    }

    pub fn fill<'a>(&'a self, column: usize, value: Option<&'a str>) -> &'a str {
        value.unwrap_or(&self.statistics[column])
    }

    pub fn statistics(&self) -> &[String] {
        &self.statistics
    }
}

fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// При равных частотах выигрывает наименьшее значение
fn most_frequent(values: &[Option<&str>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &value in values.iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn median_ignores_missing_values() {
        let imputer = MedianImputer::fit(
            &names(2),
            &[
                vec![Some(3.0), None, Some(1.0), Some(2.0)],
                vec![Some(4.0), Some(1.0), None, None],
            ],
        )
        .unwrap();

        assert_eq!(imputer.statistics(), &[2.0, 2.5]);
        assert_eq!(imputer.fill(0, None), 2.0);
        assert_eq!(imputer.fill(1, Some(7.0)), 7.0);
    }

    #[test]
    fn all_missing_column_is_an_error() {
        let err = MedianImputer::fit(&names(1), &[vec![None, None]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transformation);
    }

    #[test]
    fn mode_breaks_ties_by_smallest_value() {
        let imputer = MostFrequentImputer::fit(
            &names(2),
            &[
                vec![Some("b"), Some("a"), Some("b"), None],
                vec![Some("z"), Some("y"), None, None],
            ],
        )
        .unwrap();

        assert_eq!(imputer.statistics(), &["b".to_string(), "y".to_string()]);
        assert_eq!(imputer.fill(0, None), "b");
        assert_eq!(imputer.fill(0, Some("a")), "a");
    }
}
