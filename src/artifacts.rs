//! Сохранение и загрузка артефактов (JSON)

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ErrorContext, ErrorKind, Result};

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(ErrorKind::Persistence, || {
                format!("Failed to create directory {}", parent.display())
            }),
        _ => Ok(()),
    }
}

/// Записывает объект в `path`, перезаписывая существующий файл
pub fn save_object<T: Serialize + ?Sized>(path: impl AsRef<Path>, object: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .with_context(ErrorKind::Persistence, || format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, object)
        .with_context(ErrorKind::Persistence, || format!("Failed to serialize {}", path.display()))?;
    writer
        .flush()
        .with_context(ErrorKind::Persistence, || format!("Failed to write {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Artifact saved");
    Ok(())
}

pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(ErrorKind::Persistence, || format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(ErrorKind::Persistence, || format!("Failed to parse {}", path.display()))
}
