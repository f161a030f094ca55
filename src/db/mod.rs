//! Database module for SQLite persistence.
//!
//! SQLite is the remote table store that content lists are reconciled against.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::sync::{ColumnType, ContentKind};

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for kind in ContentKind::ALL {
        sqlx::query(&create_table_sql(kind)).execute(pool).await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at);",
            table = kind.table()
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// `CREATE TABLE` statement for a content kind, derived from its column list.
fn create_table_sql(kind: ContentKind) -> String {
    let columns: Vec<String> = kind
        .columns()
        .iter()
        .map(|(name, ty)| {
            let decl = match ty {
                ColumnType::Text => "TEXT NOT NULL DEFAULT ''",
                ColumnType::Integer => "INTEGER NOT NULL DEFAULT 0",
                ColumnType::Bool => "INTEGER NOT NULL DEFAULT 0",
                ColumnType::OptionalReal => "REAL",
            };
            format!("{} {}", name, decl)
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, {}, created_at TEXT NOT NULL);",
        kind.table(),
        columns.join(", ")
    )
}
