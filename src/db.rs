use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        email         TEXT NOT NULL,
        nickname      TEXT NULL,
        token         TEXT NOT NULL,
        registered_at TEXT NOT NULL,
        confirmed     INTEGER NOT NULL DEFAULT 0,
        confirmed_at  TEXT NULL,

        PRIMARY KEY (email)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_token_idx ON users (token)",
];

/// Open the SQLite database at `path`, creating the file (and parent
/// directories) on first use, and apply the schema. Journal mode is WAL so
/// readers proceed while a write is in flight; every mutation in this crate
/// is a single statement, which together with SQLite's write serialization
/// keeps the uniqueness and single-confirmation invariants under concurrent
/// requests.
pub async fn connect(path: &str) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("open SQLite database at {path}"))?;

    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for stmt in SCHEMA_STATEMENTS {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .context("apply database schema")?;
    }
    Ok(())
}

/// Single-connection in-memory database for tests. One connection is the
/// point: every connection to `:memory:` is a distinct database.
#[cfg(test)]
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("open in-memory SQLite database")?;
    apply_schema(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_usable_after_connect() {
        let pool = connect_in_memory().await.expect("connect");
        sqlx::query("INSERT INTO users (email, nickname, token, registered_at, confirmed) VALUES ('a@b.c', NULL, 't1', '2026-01-01T00:00:00Z', 0)")
            .execute(&pool)
            .await
            .expect("insert");
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn apply_schema_is_idempotent() {
        let pool = connect_in_memory().await.expect("connect");
        apply_schema(&pool).await.expect("second apply");
    }

    #[tokio::test]
    async fn connect_creates_missing_file_and_directories() {
        let dir = std::env::temp_dir().join(format!("guestlist-db-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("signup.db");
        let path_str = path.to_str().expect("utf-8 temp path");

        let pool = connect(path_str).await.expect("connect");
        assert!(path.exists());

        // Reopening an existing file must not wipe it.
        sqlx::query("INSERT INTO users (email, nickname, token, registered_at, confirmed) VALUES ('a@b.c', NULL, 't1', '2026-01-01T00:00:00Z', 0)")
            .execute(&pool)
            .await
            .expect("insert");
        pool.close().await;

        let pool = connect(path_str).await.expect("reconnect");
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(n, 1);
        pool.close().await;

        let _ = std::fs::remove_dir_all(&dir);
    }
}
