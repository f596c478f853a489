//! Tenant identity and the per-call caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Identifier of the tenant (principal) that owns a set of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub i64);

impl TenantId {
    /// Create a new tenant ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A verified caller of the account service.
///
/// Carries the tenant resolved by the transport and an optional deadline for
/// the call. Holding a `Caller` means authentication already happened; the
/// service never looks the tenant up on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    tenant: TenantId,
    deadline: Option<Instant>,
}

impl Caller {
    /// Creates a caller for the given tenant with no deadline.
    #[must_use]
    pub const fn new(tenant: TenantId) -> Self {
        Self {
            tenant,
            deadline: None,
        }
    }

    /// Sets an absolute deadline for the call.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the tenant this call acts for.
    #[must_use]
    pub const fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
