//! `SQLite` account store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use super::model::{Account, AccountId};
use super::store::{AccountStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::tenant::TenantId;

/// Account store backed by a `SQLite` connection pool.
///
/// The pool is the only shared resource and is safe to use from many
/// in-flight operations at once. Each statement commits on its own.
#[derive(Debug, Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    /// Create a new store with the given database path and default pool settings.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> StoreResult<Self> {
        Self::connect(&StoreConfig::with_path(database_path)).await
    }

    /// Create a store from configuration.
    ///
    /// Creates the parent directory, the database and the tables if they
    /// don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_connections` is zero, or if the database
    /// connection fails or schema creation fails.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        const OP: &str = "store.connect";

        if config.max_connections == 0 {
            return Err(StoreError::new(
                OP,
                sqlx::Error::Configuration("max_connections must be at least 1".into()),
            ));
        }

        if let Some(parent) = config.database_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::new(OP, sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::new(OP, e))?;

        debug!(path = %config.database_path.display(), "Opened account database");

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> StoreResult<Self> {
        // Every connection to :memory: is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::new("store.connect", e))?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Closes the underlying pool. Later operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Initialize database schema.
    async fn initialize(&self) -> StoreResult<()> {
        const OP: &str = "store.initialize";

        // AUTOINCREMENT keeps ids from being reused after a row is removed.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                login TEXT NOT NULL,
                secret TEXT NOT NULL,
                info TEXT NOT NULL DEFAULT '',
                owner INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        // Per-tenant listing
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_accounts_owner ON accounts(owner)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create(
        &self,
        login: &str,
        secret: &str,
        info: &str,
        owner: TenantId,
    ) -> StoreResult<AccountId> {
        let result = sqlx::query(
            r"
            INSERT INTO accounts (login, secret, info, owner)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(login)
        .bind(secret)
        .bind(info)
        .bind(owner.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new("store.create", e))?;

        Ok(AccountId::new(result.last_insert_rowid()))
    }

    async fn update(
        &self,
        id: AccountId,
        login: &str,
        secret: &str,
        info: &str,
        owner: TenantId,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE accounts SET
                login = ?, secret = ?, info = ?
            WHERE id = ? AND owner = ?
            ",
        )
        .bind(login)
        .bind(secret)
        .bind(info)
        .bind(id.0)
        .bind(owner.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new("store.update", e))?;

        Ok(result.rows_affected())
    }

    async fn list_by_owner(&self, owner: TenantId) -> StoreResult<Vec<Account>> {
        const OP: &str = "store.list_by_owner";

        let rows = sqlx::query(
            r"
            SELECT id, login, secret, info, owner
            FROM accounts
            WHERE owner = ?
            ORDER BY id ASC
            ",
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        rows.iter()
            .map(row_to_account)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::new(OP, e))
    }
}

/// Convert a database row to an Account.
fn row_to_account(row: &SqliteRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: AccountId::new(row.try_get("id")?),
        owner: TenantId::new(row.try_get("owner")?),
        login: row.try_get("login")?,
        secret: row.try_get("secret")?,
        info: row.try_get("info")?,
    })
}
