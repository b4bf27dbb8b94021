//! One-hot кодирование категориальных признаков

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::UnknownCategory;
use crate::error::{ErrorKind, PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Отсортированные категории каждого столбца
    categories: Vec<Vec<String>>,
    handle_unknown: UnknownCategory,
}

/// Результат кодирования одного значения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoded {
    /// Индекс внутри блока столбца
    Known(usize),
    Unknown,
}

impl OneHotEncoder {
    pub fn fit(columns: &[Vec<&str>], handle_unknown: UnknownCategory) -> Self {
        let categories = columns
            .iter()
            .map(|values| {
                values
                    .iter()
                    .copied()
                    .collect::<BTreeSet<&str>>()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        Self {
            categories,
            handle_unknown,
        }
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Суммарная ширина всех блоков
    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Смещение блока столбца `column` в выходе кодировщика
    pub fn block_offset(&self, column: usize) -> usize {
        self.categories[..column].iter().map(Vec::len).sum()
    }

    pub fn encode(&self, column: usize, column_name: &str, value: &str) -> Result<Encoded> {
        match self.categories[column].binary_search_by(|c| c.as_str().cmp(value)) {
            Ok(idx) => Ok(Encoded::Known(idx)),
            Err(_) => match self.handle_unknown {
                UnknownCategory::Ignore => Ok(Encoded::Unknown),
                UnknownCategory::Error => Err(PipelineError::new(
                    ErrorKind::Transformation,
                    format!("Found unknown category '{value}' in column '{column_name}'"),
                )),
            },
        }
    }

    /// Имена выходных признаков вида `<столбец>_<категория>`
    pub fn feature_names(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .zip(&self.categories)
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{name}_{c}")))
            .collect()
    }
}
