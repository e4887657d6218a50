/// Database layer
///
/// Creates the SQLite connection pool and initializes the invite code
/// schema. The schema keeps `0 <= uses <= max_uses` enforced at the
/// storage layer as well, backing the conditional-update accounting.
use crate::error::InviteResult;
use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> InviteResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(sqlx::Error::Io)?;
    }

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await?;

    Ok(pool)
}

/// Initialize the invite code schema
pub async fn init_schema(pool: &SqlitePool) -> InviteResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invite_code (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            issued_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            max_uses INTEGER NOT NULL CHECK (max_uses > 0),
            uses INTEGER NOT NULL DEFAULT 0 CHECK (uses >= 0 AND uses <= max_uses)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_invite_code_issued_by ON invite_code (issued_by)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> InviteResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}
