//! Storage contract for accounts.

use async_trait::async_trait;

use super::model::{Account, AccountId};
use crate::tenant::TenantId;

/// A storage failure, tagged with the store operation that produced it.
#[derive(Debug, thiserror::Error)]
#[error("{op} failed")]
pub struct StoreError {
    op: &'static str,
    #[source]
    source: sqlx::Error,
}

impl StoreError {
    /// Wraps a database error with the name of the failing operation.
    #[must_use]
    pub const fn new(op: &'static str, source: sqlx::Error) -> Self {
        Self { op, source }
    }

    /// Name of the store operation that failed.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        self.op
    }

    /// The underlying database error.
    #[must_use]
    pub const fn database_error(&self) -> &sqlx::Error {
        &self.source
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Tenant-scoped persistence for accounts.
///
/// Every method takes the owning tenant explicitly and implementations must
/// apply it as a filter in the statement itself.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new account and returns the identifier assigned to it.
    async fn create(
        &self,
        login: &str,
        secret: &str,
        info: &str,
        owner: TenantId,
    ) -> StoreResult<AccountId>;

    /// Replaces login, secret and info of the account matching both `id`
    /// and `owner`. Returns the number of affected rows (0 or 1).
    async fn update(
        &self,
        id: AccountId,
        login: &str,
        secret: &str,
        info: &str,
        owner: TenantId,
    ) -> StoreResult<u64>;

    /// Returns every account owned by `owner`.
    async fn list_by_owner(&self, owner: TenantId) -> StoreResult<Vec<Account>>;
}
