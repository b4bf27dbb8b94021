//! Единый тип ошибки пайплайна
//!
//! Каждая ошибка несёт вид (`ErrorKind`), сообщение, исходную причину
//! и место в коде, где она была создана. Логирование ошибок выполняется
//! отдельно, в точках вызова стадий.

use std::fmt;
use std::panic::Location;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Файл данных отсутствует, не читается или не совпадает со схемой
    DataLoad,
    /// Ошибка при обучении или применении препроцессора
    Transformation,
    /// Ошибка внутри fit/predict одного из кандидатов
    Training,
    /// Ни одна модель не прошла порог качества
    InsufficientModelQuality,
    /// Не удалось записать или прочитать артефакт
    Persistence,
    /// Некорректная конфигурация
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DataLoad => "data load error",
            ErrorKind::Transformation => "transformation error",
            ErrorKind::Training => "training error",
            ErrorKind::InsufficientModelQuality => "insufficient model quality",
            ErrorKind::Persistence => "persistence error",
            ErrorKind::Config => "configuration error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind} in [{location}]: {message}")]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
    location: &'static Location<'static>,
    #[source]
    source: Option<BoxError>,
}

impl PipelineError {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
            source: None,
        }
    }

    #[track_caller]
    pub fn with_source(kind: ErrorKind, message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Место создания ошибки (файл, строка, столбец)
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Сообщение вместе со всей цепочкой причин, для логов
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str(": ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

/// Оборачивает ошибки сторонних библиотек в `PipelineError`,
/// сохраняя место вызова.
pub trait ErrorContext<T> {
    fn context(self, kind: ErrorKind, message: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, kind: ErrorKind, message: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[track_caller]
    fn context(self, kind: ErrorKind, message: impl Into<String>) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(PipelineError::with_source(kind, message, err)),
        }
    }

    #[track_caller]
    fn with_context<F, S>(self, kind: ErrorKind, message: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(PipelineError::with_source(kind, message(), err)),
        }
    }
}

/// Записывает ошибку стадии в лог.
pub(crate) fn log_failure(stage: &str, err: &PipelineError) {
    tracing::error!(
        stage,
        kind = %err.kind(),
        location = %err.location(),
        "{}",
        err.report()
    );
}
