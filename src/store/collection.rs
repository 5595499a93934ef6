//! Generic persistence for one named collection of records.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{AppError, AppResult};

/// One collection, materialized as `<data_dir>/<name>.json`.
///
/// `load_all` / `save_all` have last-writer-wins semantics: two concurrent
/// read-modify-write cycles that both load the same snapshot will have the
/// second save silently overwrite the first. Within this process that race
/// is closed by `lock_exclusive`, which every mutating cycle must hold
/// across its load-modify-save; plain reads stay unguarded.
pub struct Collection<T> {
    name: String,
    path: PathBuf,
    writer: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            path: self.path.clone(),
            writer: Arc::clone(&self.writer),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(data_dir: impl Into<PathBuf>, name: &str) -> Self {
        let data_dir = data_dir.into();
        Self {
            name: name.to_string(),
            path: data_dir.join(format!("{}.json", name)),
            writer: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    /// Create the data directory and an empty (`[]`) collection file if none
    /// exists. Idempotent; never touches an existing file.
    pub async fn initialize(&self) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(AppError::StorageUnavailable)?;
        }

        // create_new loses the race cleanly if another process got there first
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(mut file) => {
                file.write_all(b"[]")
                    .await
                    .map_err(AppError::StorageUnavailable)?;
                file.sync_all()
                    .await
                    .map_err(AppError::StorageUnavailable)?;
                tracing::info!("Created empty collection '{}'", self.name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(AppError::StorageUnavailable(e)),
        }
    }

    /// Deserialize the entire collection.
    pub async fn load_all(&self) -> AppResult<Vec<T>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(AppError::StorageUnavailable)?;

        serde_json::from_slice(&bytes).map_err(|source| AppError::StorageCorrupt {
            collection: self.name.clone(),
            source,
        })
    }

    /// Serialize and atomically replace the collection's file content.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the target, so readers observe either the old content or the new,
    /// never a partial write.
    pub async fn save_all(&self, records: &[T]) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| AppError::Internal(format!("Failed to serialize '{}': {}", self.name, e)))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(AppError::StorageUnavailable)?;
        file.write_all(&json)
            .await
            .map_err(AppError::StorageUnavailable)?;
        file.sync_all()
            .await
            .map_err(AppError::StorageUnavailable)?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(AppError::StorageUnavailable)
    }

    /// Serialize read-modify-write cycles for this collection.
    ///
    /// Hold the guard across load, mutate and save. Without it two
    /// concurrent cycles would both load the same snapshot and the second
    /// save would silently drop the first one's changes.
    pub async fn lock_exclusive(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}
