//! Full-list reconciliation against a table-backed store.
//!
//! A save always carries the complete desired list for one content kind. The
//! reconciler reads the ids currently stored, deletes the ones that are no
//! longer wanted in a single bulk call, then upserts every desired record by id.
//!
//! The three steps are not atomic. Each failed delete/upsert is logged and
//! collected in the [`ReconcileReport`]; the loop keeps going so one bad row
//! does not block the rest of the list. Callers turn an incomplete report into
//! [`AppError::RemoteWrite`] with [`ReconcileReport::into_result`].

mod records;
#[cfg(test)]
pub mod testing;

use std::collections::HashSet;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{AppError, FailedStep};

/// The content collections that are synchronized as full lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Tours,
    BlogPosts,
    Testimonials,
    WhyChooseUs,
}

/// Storage type of a non-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Bool,
    OptionalReal,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Tours,
        ContentKind::BlogPosts,
        ContentKind::Testimonials,
        ContentKind::WhyChooseUs,
    ];

    /// Table name in the SQLite store.
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Tours => "tours",
            ContentKind::BlogPosts => "blog_posts",
            ContentKind::Testimonials => "testimonials",
            ContentKind::WhyChooseUs => "why_choose_us",
        }
    }

    /// Key of the full-list snapshot in local mode.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ContentKind::Tours => "sunny_tours",
            ContentKind::BlogPosts => "sunny_blog_posts",
            ContentKind::Testimonials => "sunny_testimonials",
            ContentKind::WhyChooseUs => "sunny_why_choose_us",
        }
    }

    /// Non-key columns, in schema order.
    pub fn columns(&self) -> &'static [(&'static str, ColumnType)] {
        match self {
            ContentKind::Tours => &[
                ("title", ColumnType::Text),
                ("destination", ColumnType::Text),
                ("departure_city", ColumnType::Text),
                ("departure_date", ColumnType::Text),
                ("description", ColumnType::Text),
                ("image", ColumnType::Text),
                ("itinerary_link", ColumnType::Text),
                ("status", ColumnType::Text),
                ("is_full", ColumnType::Bool),
                ("price", ColumnType::OptionalReal),
            ],
            ContentKind::BlogPosts => &[
                ("title", ColumnType::Text),
                ("content", ColumnType::Text),
                ("category", ColumnType::Text),
                ("image", ColumnType::Text),
                ("publish_date", ColumnType::Text),
            ],
            ContentKind::Testimonials => &[
                ("name", ColumnType::Text),
                ("tour_name", ColumnType::Text),
                ("quote", ColumnType::Text),
                ("image", ColumnType::Text),
                ("rating", ColumnType::Integer),
            ],
            ContentKind::WhyChooseUs => &[
                ("title", ColumnType::Text),
                ("description", ColumnType::Text),
                ("icon", ColumnType::Text),
            ],
        }
    }
}

/// A single column value in storage form.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Real(f64),
    Null,
}

/// A record translated into storage column names.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageRow {
    pub id: String,
    pub columns: Vec<(&'static str, ColumnValue)>,
}

impl StorageRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            columns: Vec::new(),
        }
    }

    pub fn with(mut self, column: &'static str, value: ColumnValue) -> Self {
        self.columns.push((column, value));
        self
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn text(&self, column: &str) -> Result<String, AppError> {
        match self.get(column) {
            Some(ColumnValue::Text(s)) => Ok(s.clone()),
            Some(ColumnValue::Null) => Ok(String::new()),
            other => Err(self.type_error(column, "text", other)),
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64, AppError> {
        match self.get(column) {
            Some(ColumnValue::Integer(v)) => Ok(*v),
            other => Err(self.type_error(column, "integer", other)),
        }
    }

    pub fn boolean(&self, column: &str) -> Result<bool, AppError> {
        match self.get(column) {
            Some(ColumnValue::Bool(v)) => Ok(*v),
            Some(ColumnValue::Integer(v)) => Ok(*v != 0),
            other => Err(self.type_error(column, "bool", other)),
        }
    }

    pub fn optional_real(&self, column: &str) -> Result<Option<f64>, AppError> {
        match self.get(column) {
            Some(ColumnValue::Real(v)) => Ok(Some(*v)),
            Some(ColumnValue::Integer(v)) => Ok(Some(*v as f64)),
            Some(ColumnValue::Null) | None => Ok(None),
            other => Err(self.type_error(column, "real", other)),
        }
    }

    fn type_error(&self, column: &str, expected: &str, found: Option<&ColumnValue>) -> AppError {
        AppError::Database(format!(
            "Row {}: column {} expected {}, found {:?}",
            self.id, column, expected, found
        ))
    }
}

/// A record kind that can be reconciled by id.
pub trait SyncRecord: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const KIND: ContentKind;

    fn id(&self) -> &str;

    /// Translate semantic fields into storage columns.
    fn to_row(&self) -> StorageRow;

    /// Translate storage columns back into the record.
    fn from_row(row: &StorageRow) -> Result<Self, AppError>;

    /// Field-level checks run before any save.
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Initial list for a snapshot store that has never been written.
    fn seed() -> Vec<Self> {
        Vec::new()
    }
}

/// Generic table access used by the reconciler.
#[async_trait]
pub trait TableAccess: Send + Sync {
    /// Ids currently stored for `kind`.
    async fn list_ids(&self, kind: ContentKind) -> Result<Vec<String>, AppError>;

    /// Delete exactly the given ids. Returns the number of rows removed.
    async fn delete_by_ids(&self, kind: ContentKind, ids: &[String]) -> Result<u64, AppError>;

    /// Insert or replace one row keyed by its id.
    async fn upsert(&self, kind: ContentKind, row: &StorageRow) -> Result<(), AppError>;
}

/// Outcome of one reconciliation, step by step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub kind: ContentKind,
    pub deleted: Vec<String>,
    pub upserted: Vec<String>,
    pub failures: Vec<FailedStep>,
}

impl ReconcileReport {
    fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            deleted: Vec::new(),
            upserted: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Every issued step succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Convert a report with failed steps into a remote write error.
    pub fn into_result(self) -> Result<Self, AppError> {
        if self.is_complete() {
            return Ok(self);
        }
        Err(AppError::RemoteWrite {
            message: format!(
                "Saving {} was partially applied: {} step(s) failed",
                self.kind.table(),
                self.failures.len()
            ),
            failed: self.failures,
        })
    }
}

/// Check a full list before it is saved: ids present and unique, fields valid.
pub fn validate_list<R: SyncRecord>(desired: &[R]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for record in desired {
        if record.id().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Every {} entry needs an id",
                R::KIND.table()
            )));
        }
        if !seen.insert(record.id()) {
            return Err(AppError::Validation(format!(
                "Duplicate id {} in {}",
                record.id(),
                R::KIND.table()
            )));
        }
        record.validate()?;
    }
    Ok(())
}

/// Make the stored collection for `R::KIND` match `desired` exactly.
pub async fn reconcile<R, T>(table: &T, desired: &[R]) -> Result<ReconcileReport, AppError>
where
    R: SyncRecord,
    T: TableAccess + ?Sized,
{
    validate_list(desired)?;

    let kind = R::KIND;
    let existing = table.list_ids(kind).await.map_err(|e| {
        tracing::error!("Failed to read existing {} ids: {}", kind.table(), e);
        AppError::RemoteRead(format!(
            "Could not read existing {}: {}",
            kind.table(),
            e.message()
        ))
    })?;

    let keep: HashSet<&str> = desired.iter().map(|r| r.id()).collect();
    let to_delete: Vec<String> = existing
        .into_iter()
        .filter(|id| !keep.contains(id.as_str()))
        .collect();

    let mut report = ReconcileReport::new(kind);

    if !to_delete.is_empty() {
        match table.delete_by_ids(kind, &to_delete).await {
            Ok(_) => report.deleted = to_delete,
            Err(e) => {
                tracing::error!("Failed to delete {} {:?}: {}", kind.table(), to_delete, e);
                report.failures.push(FailedStep {
                    step: "delete".to_string(),
                    ids: to_delete,
                    message: e.message(),
                });
            }
        }
    }

    for record in desired {
        let row = record.to_row();
        match table.upsert(kind, &row).await {
            Ok(()) => report.upserted.push(row.id),
            Err(e) => {
                tracing::error!("Failed to upsert {} {}: {}", kind.table(), row.id, e);
                report.failures.push(FailedStep {
                    step: "upsert".to_string(),
                    ids: vec![row.id],
                    message: e.message(),
                });
            }
        }
    }

    tracing::info!(
        "Reconciled {}: {} deleted, {} upserted, {} failed",
        kind.table(),
        report.deleted.len(),
        report.upserted.len(),
        report.failures.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::testing::{Call, MemoryTable};
    use super::*;
    use crate::models::{TourRecord, WhyChooseUsItem};

    fn item(id: &str, title: &str) -> WhyChooseUsItem {
        WhyChooseUsItem {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            icon: "star".to_string(),
        }
    }

    fn tour(id: &str) -> TourRecord {
        TourRecord {
            id: id.to_string(),
            ..crate::catalog::default_tour()
        }
    }

    #[tokio::test]
    async fn test_reconcile_matches_desired_ids_exactly() {
        let table = MemoryTable::default();
        reconcile(&table, &[item("a", "A"), item("b", "B"), item("c", "C")])
            .await
            .unwrap();

        let desired = vec![item("b", "B2"), item("d", "D")];
        let report = reconcile(&table, &desired).await.unwrap();

        assert!(report.is_complete());
        let mut deleted = report.deleted.clone();
        deleted.sort();
        assert_eq!(deleted, vec!["a", "c"]);
        assert_eq!(report.upserted, vec!["b", "d"]);

        let stored: Vec<WhyChooseUsItem> = table.records(ContentKind::WhyChooseUs).await;
        let mut ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["b", "d"]);
        let b = stored.iter().find(|r| r.id == "b").unwrap();
        assert_eq!(b, &desired[0]);
    }

    #[tokio::test]
    async fn test_reconcile_twice_is_a_no_op() {
        let table = MemoryTable::default();
        let desired = vec![tour("t1"), tour("t2")];
        reconcile(&table, &desired).await.unwrap();
        let before: Vec<TourRecord> = table.records(ContentKind::Tours).await;

        let report = reconcile(&table, &desired).await.unwrap();

        assert!(report.deleted.is_empty());
        let after: Vec<TourRecord> = table.records(ContentKind::Tours).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_reconcile_empty_list_clears_collection() {
        let table = MemoryTable::default();
        reconcile(&table, &[item("a", "A")]).await.unwrap();

        let report = reconcile::<WhyChooseUsItem, _>(&table, &[]).await.unwrap();

        assert_eq!(report.deleted, vec!["a"]);
        assert!(table.ids(ContentKind::WhyChooseUs).await.is_empty());
    }

    #[tokio::test]
    async fn test_step_order_and_call_count() {
        let table = MemoryTable::default();
        reconcile(&table, &[item("old", "Old")]).await.unwrap();
        table.clear_calls().await;

        reconcile(&table, &[item("x", "X"), item("y", "Y")])
            .await
            .unwrap();

        assert_eq!(
            table.calls().await,
            vec![
                Call::ListIds,
                Call::Delete(vec!["old".to_string()]),
                Call::Upsert("x".to_string()),
                Call::Upsert("y".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_delete_call_when_nothing_removed() {
        let table = MemoryTable::default();
        reconcile(&table, &[item("x", "X")]).await.unwrap();
        table.clear_calls().await;

        reconcile(&table, &[item("x", "X")]).await.unwrap();

        assert_eq!(
            table.calls().await,
            vec![Call::ListIds, Call::Upsert("x".to_string())]
        );
    }

    #[tokio::test]
    async fn test_read_failure_aborts_before_mutation() {
        let table = MemoryTable::default();
        reconcile(&table, &[item("a", "A")]).await.unwrap();
        table.fail_list_ids(true).await;
        table.clear_calls().await;

        let err = reconcile::<WhyChooseUsItem, _>(&table, &[]).await.unwrap_err();

        assert!(matches!(err, AppError::RemoteRead(_)));
        assert_eq!(table.calls().await, vec![Call::ListIds]);
        table.fail_list_ids(false).await;
        assert_eq!(table.ids(ContentKind::WhyChooseUs).await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_failed_upsert_is_collected_and_loop_continues() {
        let table = MemoryTable::default();
        table.fail_upsert_of("b").await;

        let report = reconcile(&table, &[item("a", "A"), item("b", "B"), item("c", "C")])
            .await
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.upserted, vec!["a", "c"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, "upsert");
        assert_eq!(report.failures[0].ids, vec!["b"]);

        match report.into_result() {
            Err(AppError::RemoteWrite { failed, .. }) => assert_eq!(failed[0].ids, vec!["b"]),
            other => panic!("expected RemoteWrite, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_delete_still_upserts() {
        let table = MemoryTable::default();
        reconcile(&table, &[item("gone", "Gone")]).await.unwrap();
        table.fail_deletes(true).await;

        let report = reconcile(&table, &[item("new", "New")]).await.unwrap();

        assert_eq!(report.failures[0].step, "delete");
        assert_eq!(report.upserted, vec!["new"]);
        let mut ids = table.ids(ContentKind::WhyChooseUs).await;
        ids.sort();
        assert_eq!(ids, vec!["gone", "new"]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected_before_any_call() {
        let table = MemoryTable::default();

        let err = reconcile(&table, &[item("a", "A"), item("a", "A again")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(table.calls().await.is_empty());
    }

    #[test]
    fn test_storage_row_accessors() {
        let row = StorageRow::new("r1")
            .with("title", ColumnValue::Text("Jeju".into()))
            .with("is_full", ColumnValue::Integer(1))
            .with("price", ColumnValue::Null);

        assert_eq!(row.text("title").unwrap(), "Jeju");
        assert!(row.boolean("is_full").unwrap());
        assert_eq!(row.optional_real("price").unwrap(), None);
        assert!(row.integer("title").is_err());
    }
}
