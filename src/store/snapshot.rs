//! Key/value snapshot persistence for local mode.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── sunny_tours.json
//! ├── sunny_blog_posts.json
//! ├── sunny_testimonials.json
//! ├── sunny_why_choose_us.json
//! └── sunny_featured_tour_id.json
//! ```

#[cfg(test)]
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
#[cfg(test)]
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;

/// Durable string values addressed by key.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read a value, `None` if the key was never written.
    async fn load(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Overwrite a value.
    async fn save(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// One JSON file per key under a root directory.
#[derive(Clone)]
pub struct FileSnapshotStore {
    root_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::Storage(format!("Invalid snapshot key: {:?}", key)));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file, then rename over the old snapshot.
    ///
    /// Each call gets its own temp file, so overlapping saves of one key
    /// never share a half-written file; the last rename wins.
    async fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path(key)?;
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = self
            .root_dir
            .join(format!("{}.{}.tmp", key, Uuid::new_v4()));
        if let Err(e) = write_file(&tmp, value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

async fn write_file(path: &Path, value: &str) -> Result<(), AppError> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Process-local snapshots; nothing survives a restart.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySnapshotStore {
    values: RwLock<HashMap<String, String>>,
}

#[cfg(test)]
#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
