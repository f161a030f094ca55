//! Database repository for content tables.
//!
//! Statements are built from the fixed column lists in [`ContentKind`], so table
//! and column names never come from user input; values are always bound.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteRow};
use sqlx::{Executor, Row, SqlitePool};

use crate::errors::{AppError, FailedStep};
use crate::sync::{
    validate_list, ColumnType, ColumnValue, ContentKind, ReconcileReport, StorageRow, SyncRecord,
    TableAccess,
};

/// Settings key holding the featured tour id.
pub const FEATURED_TOUR_KEY: &str = "featured_tour_id";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all rows of a kind, newest first.
    pub async fn list_rows(&self, kind: ContentKind) -> Result<Vec<StorageRow>, AppError> {
        let columns: Vec<&str> = kind.columns().iter().map(|(name, _)| *name).collect();
        let sql = format!(
            "SELECT id, {} FROM {} ORDER BY created_at DESC, rowid DESC",
            columns.join(", "),
            kind.table()
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| row_to_storage(kind, row)).collect()
    }

    /// List all records of a kind, newest first.
    pub async fn list<R: SyncRecord>(&self) -> Result<Vec<R>, AppError> {
        self.list_rows(R::KIND)
            .await?
            .iter()
            .map(R::from_row)
            .collect()
    }

    /// Read a value from the settings table.
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    /// Write a value to the settings table.
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Apply a full list inside one transaction: all steps land or none do.
    pub async fn reconcile_atomic<R: SyncRecord>(
        &self,
        desired: &[R],
    ) -> Result<ReconcileReport, AppError> {
        validate_list(desired)?;
        let kind = R::KIND;

        let mut tx = self.pool.begin().await?;

        let (to_delete, upserted) = match apply_in_transaction(&mut tx, desired).await {
            Ok(steps) => steps,
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!("Rollback of {} save failed: {}", kind.table(), rollback);
                }
                return Err(e);
            }
        };

        tx.commit().await?;

        tracing::info!(
            "Reconciled {} in one transaction: {} deleted, {} upserted",
            kind.table(),
            to_delete.len(),
            upserted.len()
        );

        Ok(ReconcileReport {
            kind,
            deleted: to_delete,
            upserted,
            failures: Vec::new(),
        })
    }
}

#[async_trait]
impl TableAccess for Repository {
    async fn list_ids(&self, kind: ContentKind) -> Result<Vec<String>, AppError> {
        select_ids(&self.pool, kind).await
    }

    async fn delete_by_ids(&self, kind: ContentKind, ids: &[String]) -> Result<u64, AppError> {
        delete_ids(&self.pool, kind, ids).await
    }

    async fn upsert(&self, kind: ContentKind, row: &StorageRow) -> Result<(), AppError> {
        upsert_row(&self.pool, kind, row).await
    }
}

fn rolled_back(kind: ContentKind, step: &str, ids: Vec<String>, err: AppError) -> AppError {
    tracing::error!("Rolled back {} save at {} step: {}", kind.table(), step, err);
    AppError::RemoteWrite {
        message: format!("Saving {} was rolled back", kind.table()),
        failed: vec![FailedStep {
            step: step.to_string(),
            ids,
            message: err.message(),
        }],
    }
}

/// Delete and upsert steps of one reconcile, run inside an open transaction.
async fn apply_in_transaction<R: SyncRecord>(
    conn: &mut SqliteConnection,
    desired: &[R],
) -> Result<(Vec<String>, Vec<String>), AppError> {
    let kind = R::KIND;

    let existing = select_ids(&mut *conn, kind).await.map_err(|e| {
        AppError::RemoteRead(format!(
            "Could not read existing {}: {}",
            kind.table(),
            e.message()
        ))
    })?;

    let to_delete: Vec<String> = existing
        .into_iter()
        .filter(|id| !desired.iter().any(|r| r.id() == id))
        .collect();

    if !to_delete.is_empty() {
        delete_ids(&mut *conn, kind, &to_delete)
            .await
            .map_err(|e| rolled_back(kind, "delete", to_delete.clone(), e))?;
    }

    let mut upserted = Vec::with_capacity(desired.len());
    for record in desired {
        let row = record.to_row();
        upsert_row(&mut *conn, kind, &row)
            .await
            .map_err(|e| rolled_back(kind, "upsert", vec![row.id.clone()], e))?;
        upserted.push(row.id);
    }

    Ok((to_delete, upserted))
}

// Statement helpers shared by the pool and transaction paths

async fn select_ids<'e, E>(executor: E, kind: ContentKind) -> Result<Vec<String>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT id FROM {}", kind.table());
    let rows = sqlx::query(&sql).fetch_all(executor).await?;
    Ok(rows.iter().map(|row| row.get("id")).collect())
}

async fn delete_ids<'e, E>(executor: E, kind: ContentKind, ids: &[String]) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("DELETE FROM {} WHERE id IN ({})", kind.table(), placeholders);

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let result = query.execute(executor).await?;
    Ok(result.rows_affected())
}

async fn upsert_row<'e, E>(executor: E, kind: ContentKind, row: &StorageRow) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let schema = kind.columns();
    let names: Vec<&str> = schema.iter().map(|(name, _)| *name).collect();
    let placeholders = vec!["?"; names.len() + 2].join(", ");
    let updates: Vec<String> = names
        .iter()
        .map(|name| format!("{name} = excluded.{name}"))
        .collect();

    let sql = format!(
        "INSERT INTO {} (id, {}, created_at) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        kind.table(),
        names.join(", "),
        placeholders,
        updates.join(", ")
    );

    // created_at is only written on first insert; it keeps the retrieval order stable.
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);

    let mut query = sqlx::query(&sql).bind(&row.id);
    for (name, _) in schema {
        query = match row.get(name).cloned().unwrap_or(ColumnValue::Null) {
            ColumnValue::Text(s) => query.bind(s),
            ColumnValue::Integer(v) => query.bind(v),
            ColumnValue::Bool(v) => query.bind(v as i64),
            ColumnValue::Real(v) => query.bind(v),
            ColumnValue::Null => query.bind(Option::<String>::None),
        };
    }
    query.bind(created_at).execute(executor).await?;
    Ok(())
}

fn row_to_storage(kind: ContentKind, row: &SqliteRow) -> Result<StorageRow, AppError> {
    let mut storage = StorageRow::new(row.try_get::<String, _>("id")?);
    for (name, ty) in kind.columns() {
        let value = match ty {
            ColumnType::Text => row
                .try_get::<Option<String>, _>(*name)?
                .map(ColumnValue::Text)
                .unwrap_or(ColumnValue::Null),
            ColumnType::Integer => ColumnValue::Integer(row.try_get::<i64, _>(*name)?),
            ColumnType::Bool => ColumnValue::Bool(row.try_get::<i64, _>(*name)? != 0),
            ColumnType::OptionalReal => row
                .try_get::<Option<f64>, _>(*name)?
                .map(ColumnValue::Real)
                .unwrap_or(ColumnValue::Null),
        };
        storage = storage.with(*name, value);
    }
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{Testimonial, TourRecord, TourStatus};
    use crate::sync::reconcile;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), dir)
    }

    fn tour(id: &str, city: &str) -> TourRecord {
        TourRecord {
            id: id.to_string(),
            departure_city: city.to_string(),
            ..crate::catalog::default_tour()
        }
    }

    #[tokio::test]
    async fn test_reconcile_against_sqlite() {
        let (repo, _dir) = repo().await;

        reconcile(&repo, &[tour("a", "桃園"), tour("b", "台中")])
            .await
            .unwrap();
        let mut edited = tour("b", "高雄");
        edited.status = TourStatus::Ongoing;
        edited.is_full = true;
        edited.price = Some(45900.0);
        let report = reconcile(&repo, &[edited.clone(), tour("c", "桃園")])
            .await
            .unwrap();

        assert_eq!(report.deleted, vec!["a"]);
        let mut ids = repo.list_ids(ContentKind::Tours).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["b", "c"]);

        let stored: Vec<TourRecord> = repo.list().await.unwrap();
        let b = stored.iter().find(|t| t.id == "b").unwrap();
        assert_eq!(b, &edited);
    }

    #[tokio::test]
    async fn test_upsert_keeps_creation_order() {
        let (repo, _dir) = repo().await;

        reconcile(&repo, &[tour("first", "桃園")]).await.unwrap();
        reconcile(&repo, &[tour("first", "桃園"), tour("second", "桃園")])
            .await
            .unwrap();
        // Updating the older row must not move it to the top.
        reconcile(&repo, &[tour("first", "台中"), tour("second", "桃園")])
            .await
            .unwrap();

        let stored: Vec<TourRecord> = repo.list().await.unwrap();
        let ids: Vec<&str> = stored.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
        assert_eq!(stored[1].departure_city, "台中");
    }

    #[tokio::test]
    async fn test_delete_by_ids_only_touches_given_ids() {
        let (repo, _dir) = repo().await;
        reconcile(&repo, &[tour("a", "x"), tour("b", "x"), tour("c", "x")])
            .await
            .unwrap();

        let removed = repo
            .delete_by_ids(ContentKind::Tours, &["a".to_string(), "zzz".to_string()])
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(repo.delete_by_ids(ContentKind::Tours, &[]).await.unwrap(), 0);
        let mut ids = repo.list_ids(ContentKind::Tours).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_reconcile_atomic() {
        let (repo, _dir) = repo().await;
        repo.reconcile_atomic(&[tour("a", "x"), tour("b", "x")])
            .await
            .unwrap();

        let report = repo.reconcile_atomic(&[tour("c", "x")]).await.unwrap();

        let mut deleted = report.deleted.clone();
        deleted.sort();
        assert_eq!(deleted, vec!["a", "b"]);
        assert_eq!(repo.list_ids(ContentKind::Tours).await.unwrap(), vec!["c"]);
    }

    #[tokio::test]
    async fn test_reconcile_atomic_failure_rolls_back() {
        let (repo, _dir) = repo().await;
        repo.reconcile_atomic(&[tour("a", "桃園"), tour("b", "台中")])
            .await
            .unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_d BEFORE INSERT ON tours WHEN NEW.id = 'd' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        // a is deleted, b edited and c inserted before d fails.
        let err = repo
            .reconcile_atomic(&[tour("b", "高雄"), tour("c", "桃園"), tour("d", "桃園")])
            .await
            .unwrap_err();

        match err {
            AppError::RemoteWrite { failed, .. } => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].step, "upsert");
                assert_eq!(failed[0].ids, vec!["d"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let mut ids = repo.list_ids(ContentKind::Tours).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        let tours: Vec<TourRecord> = repo.list().await.unwrap();
        let b = tours.iter().find(|t| t.id == "b").unwrap();
        assert_eq!(b.departure_city, "台中");
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let (repo, _dir) = repo().await;
        let review = Testimonial {
            id: "r1".into(),
            name: "Amy".into(),
            tour_name: "Jeju".into(),
            quote: "Great".into(),
            image: String::new(),
            rating: 5,
        };
        reconcile(&repo, &[review.clone()]).await.unwrap();
        reconcile::<TourRecord, _>(&repo, &[]).await.unwrap();

        let stored: Vec<Testimonial> = repo.list().await.unwrap();
        assert_eq!(stored, vec![review]);
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let (repo, _dir) = repo().await;
        assert_eq!(repo.get_setting(FEATURED_TOUR_KEY).await.unwrap(), None);

        repo.set_setting(FEATURED_TOUR_KEY, "jeju-304").await.unwrap();
        repo.set_setting(FEATURED_TOUR_KEY, "busan-429").await.unwrap();

        assert_eq!(
            repo.get_setting(FEATURED_TOUR_KEY).await.unwrap().as_deref(),
            Some("busan-429")
        );
    }
}
