//! Content persistence: SQLite tables or local snapshots.
//!
//! Handlers only talk to [`ContentStore`]. In SQLite mode a save reconciles the
//! table against the submitted list; in local mode it overwrites the snapshot.

mod snapshot;

pub use snapshot::*;

use std::sync::Arc;

use crate::config::SyncMode;
use crate::db::{Repository, FEATURED_TOUR_KEY};
use crate::errors::AppError;
use crate::sync::{reconcile, validate_list, ReconcileReport, SyncRecord};

/// Snapshot key holding the featured tour id in local mode.
pub const FEATURED_SNAPSHOT_KEY: &str = "sunny_featured_tour_id";

/// Where content lists and the featured pointer live.
#[derive(Clone)]
pub enum ContentStore {
    Sqlite {
        repo: Repository,
        sync_mode: SyncMode,
    },
    Local {
        snapshots: Arc<dyn SnapshotStore>,
    },
}

impl ContentStore {
    pub fn sqlite(repo: Repository, sync_mode: SyncMode) -> Self {
        ContentStore::Sqlite { repo, sync_mode }
    }

    pub fn local(snapshots: Arc<dyn SnapshotStore>) -> Self {
        ContentStore::Local { snapshots }
    }

    /// Load the current list of a kind.
    pub async fn load<R: SyncRecord>(&self) -> Result<Vec<R>, AppError> {
        match self {
            ContentStore::Sqlite { repo, .. } => repo.list::<R>().await,
            ContentStore::Local { snapshots } => {
                let key = R::KIND.storage_key();
                match snapshots.load(key).await? {
                    Some(json) => serde_json::from_str(&json).map_err(|e| {
                        tracing::error!("Corrupt snapshot {}: {}", key, e);
                        AppError::Storage(format!("Snapshot {} is not valid JSON: {}", key, e))
                    }),
                    None => {
                        let seed = R::seed();
                        if !seed.is_empty() {
                            tracing::info!("Seeding {} with {} entries", key, seed.len());
                            snapshots.save(key, &serde_json::to_string(&seed)?).await?;
                        }
                        Ok(seed)
                    }
                }
            }
        }
    }

    /// Replace the stored list of a kind with `desired`.
    ///
    /// Returns the reconciliation report in SQLite mode.
    pub async fn save<R: SyncRecord>(
        &self,
        desired: &[R],
    ) -> Result<Option<ReconcileReport>, AppError> {
        match self {
            ContentStore::Sqlite {
                repo,
                sync_mode: SyncMode::Sequential,
            } => {
                let report = reconcile(repo, desired).await?.into_result()?;
                Ok(Some(report))
            }
            ContentStore::Sqlite {
                repo,
                sync_mode: SyncMode::Transactional,
            } => Ok(Some(repo.reconcile_atomic(desired).await?)),
            ContentStore::Local { snapshots } => {
                validate_list(desired)?;
                let json = serde_json::to_string(desired)?;
                snapshots.save(R::KIND.storage_key(), &json).await?;
                tracing::info!(
                    "Saved {} snapshot with {} entries",
                    R::KIND.storage_key(),
                    desired.len()
                );
                Ok(None)
            }
        }
    }

    /// The persisted featured tour id, empty if never set.
    pub async fn load_featured(&self) -> Result<String, AppError> {
        let value = match self {
            ContentStore::Sqlite { repo, .. } => repo.get_setting(FEATURED_TOUR_KEY).await?,
            ContentStore::Local { snapshots } => match snapshots.load(FEATURED_SNAPSHOT_KEY).await? {
                Some(json) => Some(serde_json::from_str::<String>(&json).map_err(|e| {
                    tracing::error!("Corrupt snapshot {}: {}", FEATURED_SNAPSHOT_KEY, e);
                    AppError::Storage(format!(
                        "Snapshot {} is not a JSON string: {}",
                        FEATURED_SNAPSHOT_KEY, e
                    ))
                })?),
                None => None,
            },
        };
        Ok(value.unwrap_or_default())
    }

    /// Persist the featured tour id. The id is not checked against the tour list.
    pub async fn save_featured(&self, id: &str) -> Result<(), AppError> {
        match self {
            ContentStore::Sqlite { repo, .. } => repo.set_setting(FEATURED_TOUR_KEY, id).await,
            ContentStore::Local { snapshots } => {
                snapshots
                    .save(FEATURED_SNAPSHOT_KEY, &serde_json::to_string(id)?)
                    .await
            }
        }
    }
}
