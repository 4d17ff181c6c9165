//! Database schema migrations.
//!
//! Applied versions are recorded in `_migrations`; each pending migration
//! runs in its own transaction together with its version row.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Migration list: (version, SQL), in ascending version order.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_buckets.sql"))];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the version whose SQL failed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version, "applied cache schema migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let tables: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('buckets', 'entries')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert_eq!(tables, 2);
    }

    #[tokio::test]
    async fn test_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let latest: i64 = conn
            .call(|conn| conn.query_row("SELECT MAX(version) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(latest, MIGRATIONS.last().map(|(v, _)| *v).unwrap());
    }
}
