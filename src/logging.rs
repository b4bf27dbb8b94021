//! Инициализация логирования
//!
//! Глобальный подписчик `tracing` пишет одновременно в stdout и в файл
//! `<dir>/<timestamp>.log`. Уровень задаётся через `RUST_LOG`, по умолчанию `info`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Guard фонового писателя и путь к файлу, в который он пишет
static LOG_STATE: OnceLock<(WorkerGuard, PathBuf)> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Повторные вызовы ничего не делают и возвращают путь уже открытого файла.
pub fn init(dir: impl AsRef<Path>) -> Result<PathBuf, LoggingError> {
    if let Some(path) = current_log_file() {
        return Ok(path);
    }

    let dir = dir.as_ref();
    let file_name = log_file_name(chrono::Local::now());
    let log_path = dir.join(&file_name);

    fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(dir, &file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_STATE.set((guard, log_path.clone()));

    tracing::info!("Logging initialized; log file at {}", log_path.display());
    Ok(log_path)
}

/// Файл, в который пишет установленный подписчик
pub fn current_log_file() -> Option<PathBuf> {
    LOG_STATE.get().map(|(_, path)| path.clone())
}

fn log_file_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}.log", now.format("%m_%d_%Y_%H_%M_%S"))
}
