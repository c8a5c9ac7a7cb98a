//! File-backed state store.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::storage::{StateKey, StateStore, StorageError};

/// One JSON file per key in a state directory.
///
/// Writes go to a temporary file that is renamed over the old one, so a
/// reader never sees a half-written value.
#[derive(Debug)]
pub struct FileStateStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStateStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// State directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StateKey) -> PathBuf {
        self.dir
            .join(format!("{}.json", key.as_str().replace('/', ".")))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: StateKey) -> Result<Option<Value>, StorageError> {
        let contents = match fs::read(self.path(key)).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { key, source }),
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|source| StorageError::Format { key, source })
    }

    async fn save(&self, key: StateKey, value: Value) -> Result<(), StorageError> {
        let contents =
            serde_json::to_vec_pretty(&value).map_err(|source| StorageError::Format { key, source })?;

        let path = self.path(key);
        let temp = path.with_extension("json.tmp");

        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io { key, source })?;

        fs::write(&temp, contents)
            .await
            .map_err(|source| StorageError::Io { key, source })?;

        fs::rename(&temp, &path)
            .await
            .map_err(|source| StorageError::Io { key, source })?;

        debug!(%key, path = %path.display(), "saved state");

        Ok(())
    }

    async fn remove(&self, key: StateKey) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }
}
