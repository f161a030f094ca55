//! In-memory `TableAccess` with failure injection, for tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ContentKind, StorageRow, SyncRecord, TableAccess};
use crate::errors::AppError;

/// A call observed by [`MemoryTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListIds,
    Delete(Vec<String>),
    Upsert(String),
}

#[derive(Default)]
struct Inner {
    tables: HashMap<ContentKind, BTreeMap<String, StorageRow>>,
    calls: Vec<Call>,
    fail_list: bool,
    fail_delete: bool,
    fail_upserts: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryTable {
    inner: Mutex<Inner>,
}

impl MemoryTable {
    pub async fn ids(&self, kind: ContentKind) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner
            .tables
            .get(&kind)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn records<R: SyncRecord>(&self, kind: ContentKind) -> Vec<R> {
        let inner = self.inner.lock().await;
        inner
            .tables
            .get(&kind)
            .map(|t| t.values().map(|row| R::from_row(row).unwrap()).collect())
            .unwrap_or_default()
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }

    pub async fn fail_list_ids(&self, fail: bool) {
        self.inner.lock().await.fail_list = fail;
    }

    pub async fn fail_deletes(&self, fail: bool) {
        self.inner.lock().await.fail_delete = fail;
    }

    pub async fn fail_upsert_of(&self, id: &str) {
        self.inner.lock().await.fail_upserts.insert(id.to_string());
    }
}

#[async_trait]
impl TableAccess for MemoryTable {
    async fn list_ids(&self, kind: ContentKind) -> Result<Vec<String>, AppError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(Call::ListIds);
        if inner.fail_list {
            return Err(AppError::Database("connection refused".to_string()));
        }
        Ok(inner
            .tables
            .get(&kind)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_by_ids(&self, kind: ContentKind, ids: &[String]) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(Call::Delete(ids.to_vec()));
        if inner.fail_delete {
            return Err(AppError::Database("delete rejected".to_string()));
        }
        let table = inner.tables.entry(kind).or_default();
        let removed = ids.iter().filter(|id| table.remove(*id).is_some()).count();
        Ok(removed as u64)
    }

    async fn upsert(&self, kind: ContentKind, row: &StorageRow) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(Call::Upsert(row.id.clone()));
        if inner.fail_upserts.contains(&row.id) {
            return Err(AppError::Database(format!("upsert of {} rejected", row.id)));
        }
        inner
            .tables
            .entry(kind)
            .or_default()
            .insert(row.id.clone(), row.clone());
        Ok(())
    }
}
