/// Модуль предобработки данных

pub mod column_transformer;
pub mod encoding;
pub mod imputer;
pub mod normalization;

pub use column_transformer::{FittedPreprocessor, Preprocessor, PreprocessorBuilder};
pub use encoding::OneHotEncoder;
pub use imputer::{MedianImputer, MostFrequentImputer};
pub use normalization::StandardScaler;
