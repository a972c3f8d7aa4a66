//! SQLite-backed API key storage.
//!
//! The store owns a single `api_keys` table. On first start it is seeded with one randomly
//! generated key; afterwards it only answers membership lookups. Keys are never rotated or
//! deleted here.

use crate::error::Result;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, TryRngCore as _};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};

/// Number of random bytes behind a generated key (256 bits).
const KEY_BYTES: usize = 32;

const CREATE_TABLE_SQL: &str = r"
create table if not exists api_keys (
    id integer primary key autoincrement,
    key text unique not null
)
";

// A single statement, so concurrent initializers against one file seed at most one row.
const SEED_DEFAULT_KEY_SQL: &str = r"
insert into api_keys (key)
select ?1
where not exists (select 1 from api_keys)
";

/// Generate a URL-safe API key from the OS random generator.
///
/// # Errors
///
/// Returns an error if the OS random generator is unavailable.
pub fn generate_api_key() -> Result<String> {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Set of valid API keys.
///
/// Lifecycle: [`KeyStore::open`], then [`KeyStore::initialize`] exactly once before the first
/// [`KeyStore::validate`] call. `validate` is read-only and safe to call from concurrent requests.
///
/// Keys are presented in an HTTP header, so only visible-ASCII keys can ever be matched.
/// Generated keys are URL-safe base64 and always qualify.
#[derive(Debug, Clone)]
pub struct KeyStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl KeyStore {
    /// Open (creating if missing) the SQLite database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the database file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %path.display(), "opened key store");
        Ok(Self { pool, path })
    }

    /// Location of the backing database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the schema exists and seed a default key when the table is empty.
    ///
    /// Returns the generated key when this call created it, `None` when keys already existed
    /// (including losing a seeding race to another process).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created, the insert fails for any reason other
    /// than a uniqueness race, or no random key could be generated.
    pub async fn initialize(&self) -> Result<Option<String>> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;

        if self.key_count().await? > 0 {
            return Ok(None);
        }

        let key = generate_api_key()?;
        match sqlx::query(SEED_DEFAULT_KEY_SQL)
            .bind(&key)
            .execute(&self.pool)
            .await
        {
            Ok(done) if done.rows_affected() == 1 => Ok(Some(key)),
            Ok(_) => {
                tracing::debug!("key store seeded concurrently; keeping existing key");
                Ok(None)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::debug!(error = %e, "default key insert raced; treating as initialized");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether `token` is a stored key.
    ///
    /// `None` and empty tokens are rejected without touching storage. Matching is exact: no
    /// trimming or case folding.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the lookup query fails.
    pub async fn validate(&self, token: Option<&str>) -> Result<bool> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };

        let row = sqlx::query("select 1 from api_keys where key = ?1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the table is missing or the query fails.
    pub async fn key_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("select count(*) from api_keys")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
