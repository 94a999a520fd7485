//! Flat-file counter persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CounterStoreError;
use crate::models::CounterSet;

/// Reads and atomically replaces one counter file.
#[derive(Debug, Clone)]
pub struct CounterStore {
    path: PathBuf,
}

impl CounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load counters. A missing or unreadable file yields the defaults.
    ///
    /// Bytes that are not UTF-8 only spoil the line they sit on.
    pub async fn load(&self) -> CounterSet {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => CounterSet::parse(&String::from_utf8_lossy(&bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Counter file not found, using defaults");
                CounterSet::default()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read counter file, using defaults"
                );
                CounterSet::default()
            }
        }
    }

    /// Overwrite the file with `counters`.
    ///
    /// Writes a sibling temp file and renames it over the target.
    pub async fn save(&self, counters: &CounterSet) -> Result<(), CounterStoreError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| CounterStoreError::InvalidPath(self.path.clone()))?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => return Err(CounterStoreError::InvalidPath(self.path.clone())),
        };

        let tmp_path = parent.join(format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            Uuid::new_v4().simple()
        ));

        tokio::fs::write(&tmp_path, counters.to_file_format())
            .await
            .map_err(|source| CounterStoreError::Write {
                path: tmp_path.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(CounterStoreError::Replace {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }
}
