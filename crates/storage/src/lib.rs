use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{fs, path::PathBuf, str::FromStr};

/// Local key/value cache backed by SQLite. Each key holds one serialized
/// snapshot which is overwritten wholesale on every write.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let location = locate(database_url);
        if let Some(Location::File(path)) = &location {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir).with_context(|| {
                    format!("failed to create cache directory '{}'", dir.display())
                })?;
            }
        }

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid cache database url '{database_url}'"))?
            .create_if_missing(true);
        let pool_options = if location == Some(Location::Memory) {
            // every connection to an in-memory database opens a fresh one
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open cache database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run cache migrations")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn put_cached(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_cache (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write cache key '{key}'"))?;
        Ok(())
    }

    pub async fn get_cached(&self, key: &str) -> Result<Option<CachedEntry>> {
        let row = sqlx::query("SELECT value, updated_at FROM local_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read cache key '{key}'"))?;

        row.map(|r| -> Result<CachedEntry> {
            Ok(CachedEntry {
                value: r.try_get("value")?,
                updated_at: r.try_get("updated_at")?,
            })
        })
        .transpose()
    }

    pub async fn remove_cached(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM local_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to clear cache key '{key}'"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Location {
    Memory,
    File(PathBuf),
}

/// Classifies a `sqlite:` url. Anything else, or a url without a path, is `None`.
fn locate(database_url: &str) -> Option<Location> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    if path == ":memory:" || query.split('&').any(|pair| pair == "mode=memory") {
        return Some(Location::Memory);
    }

    let path = path.strip_prefix("//").unwrap_or(path);
    (!path.is_empty()).then(|| Location::File(PathBuf::from(path)))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
