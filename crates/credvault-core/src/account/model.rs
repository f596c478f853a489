//! Account model types.

use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// Unique identifier for an account.
///
/// Assigned by the store on creation and unique across all tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored credential account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier.
    pub id: AccountId,
    /// Tenant the account belongs to.
    pub owner: TenantId,
    /// Display/account name.
    pub login: String,
    /// Opaque credential value.
    pub secret: String,
    /// Free-form auxiliary text.
    pub info: String,
}

// Secrets stay out of logs and panic messages.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("login", &self.login)
            .field("secret", &"<redacted>")
            .field("info", &self.info)
            .finish()
    }
}
