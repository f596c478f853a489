//! Transport-agnostic RPC surface for credential accounts.
//!
//! A transport (gRPC, HTTP, ...) authenticates the call, fills in a
//! [`CallContext`] and hands the decoded request to [`AccountsHandler`].
//! Results come back as response messages or as a [`Status`] whose
//! [`Code`] maps one-to-one onto the transport's standard status codes.
//!
//! ```ignore
//! let handler = AccountsHandler::new(AccountService::new(store, span));
//! let ctx = CallContext::authenticated(TenantId::new(7));
//!
//! let saved = handler
//!     .save(&ctx, SaveRequest::new("a@b.com", "pw"))
//!     .await?;
//! let all = handler.get_all(&ctx, GetAllRequest {}).await?;
//! ```

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::account::{Account, AccountId, AccountStore, validate_fields, validate_update};
use crate::error::{Error, ErrorKind};
use crate::service::{AccountService, OP_GET_ALL, OP_SAVE, OP_UPDATE};
use crate::tenant::{Caller, TenantId};

/// Request-scoped data attached by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Verified tenant identity, if authentication produced one.
    pub tenant: Option<TenantId>,
    /// Deadline propagated from the client, if any.
    pub deadline: Option<Instant>,
}

impl CallContext {
    /// A context carrying a verified tenant.
    #[must_use]
    pub const fn authenticated(tenant: TenantId) -> Self {
        Self {
            tenant: Some(tenant),
            deadline: None,
        }
    }

    /// A context without tenant identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            tenant: None,
            deadline: None,
        }
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Resolves the caller, failing closed when no tenant is attached.
    ///
    /// # Errors
    ///
    /// Returns an `Unauthenticated` error for `op` if the tenant is missing.
    pub fn caller(&self, op: &'static str) -> Result<Caller, Error> {
        let tenant = self.tenant.ok_or_else(|| Error::unauthenticated(op))?;
        let caller = Caller::new(tenant);
        Ok(match self.deadline {
            Some(deadline) => caller.with_deadline(deadline),
            None => caller,
        })
    }
}

/// Status code of a failed call.
///
/// Numeric values follow the gRPC status code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Code {
    /// The call was canceled or its deadline passed.
    ///
    /// Wire spelling of [`ErrorKind::Canceled`].
    Cancelled = 1,
    /// A required field is missing.
    InvalidArgument = 3,
    /// No matching account.
    NotFound = 5,
    /// Server-side failure.
    Internal = 13,
    /// No verified tenant identity.
    Unauthenticated = 16,
}

impl Code {
    /// Numeric wire value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<ErrorKind> for Code {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => Self::InvalidArgument,
            ErrorKind::Unauthenticated => Self::Unauthenticated,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Canceled => Self::Cancelled,
            ErrorKind::Internal => Self::Internal,
        }
    }
}

/// A failed call as seen by the client.
///
/// The message never carries storage details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct Status {
    /// Status code.
    pub code: Code,
    /// Client-facing message.
    pub message: String,
}

impl Status {
    /// Creates a status.
    #[must_use]
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        let message = match err.kind() {
            ErrorKind::InvalidArgument => err
                .validation_error()
                .map_or("invalid argument", |v| v.message()),
            ErrorKind::Unauthenticated => "missing tenant identity",
            ErrorKind::NotFound => "account not found",
            ErrorKind::Canceled => "deadline exceeded",
            ErrorKind::Internal => internal_message(err.op()),
        };
        Self::new(err.kind().into(), message)
    }
}

fn internal_message(op: &str) -> &'static str {
    match op {
        OP_SAVE => "failed to save account",
        OP_UPDATE => "failed to update account",
        OP_GET_ALL => "failed to get all accounts",
        _ => "internal error",
    }
}

/// An account as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account ID.
    pub id: i64,
    /// Login.
    pub login: String,
    /// Secret.
    pub secret: String,
    /// Auxiliary info.
    pub info: String,
}

impl From<Account> for AccountRecord {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.0,
            login: account.login,
            secret: account.secret,
            info: account.info,
        }
    }
}

/// `GetAll` request. The tenant comes from the call context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllRequest {}

/// `GetAll` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllResponse {
    /// The caller's accounts.
    pub accounts: Vec<AccountRecord>,
}

/// `Save` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Login (required).
    pub login: String,
    /// Secret (required).
    pub secret: String,
    /// Auxiliary info (optional).
    #[serde(default)]
    pub info: String,
}

impl SaveRequest {
    /// Creates a request with empty info.
    #[must_use]
    pub fn new(login: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            secret: secret.into(),
            info: String::new(),
        }
    }

    /// Sets the info field.
    #[must_use]
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }
}

/// `Save` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    /// ID assigned to the new account.
    pub id: i64,
}

/// `Update` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// ID of the account to update (required).
    pub id: i64,
    /// New login (required).
    pub login: String,
    /// New secret (required).
    pub secret: String,
    /// New auxiliary info (optional).
    #[serde(default)]
    pub info: String,
}

/// `Update` response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {}

/// Binds the RPC operations to an [`AccountService`].
///
/// Checks run in a fixed order: request fields, then tenant identity, then
/// the service call.
#[derive(Debug)]
pub struct AccountsHandler<S> {
    service: AccountService<S>,
}

impl<S: AccountStore> AccountsHandler<S> {
    /// Creates a handler over the given service.
    #[must_use]
    pub const fn new(service: AccountService<S>) -> Self {
        Self { service }
    }

    /// The wrapped service.
    #[must_use]
    pub const fn service(&self) -> &AccountService<S> {
        &self.service
    }

    /// Lists the caller's accounts.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `Cancelled` or `Internal`.
    pub async fn get_all(
        &self,
        ctx: &CallContext,
        _request: GetAllRequest,
    ) -> Result<GetAllResponse, Status> {
        let caller = ctx.caller(OP_GET_ALL)?;
        let accounts = self.service.get_all(&caller).await?;
        Ok(GetAllResponse {
            accounts: accounts.into_iter().map(AccountRecord::from).collect(),
        })
    }

    /// Stores a new account for the caller.
    ///
    /// # Errors
    ///
    /// `InvalidArgument`, `Unauthenticated`, `Cancelled` or `Internal`.
    pub async fn save(&self, ctx: &CallContext, request: SaveRequest) -> Result<SaveResponse, Status> {
        validate_fields(&request.login, &request.secret)
            .map_err(|e| Error::invalid_argument(OP_SAVE, e))?;
        let caller = ctx.caller(OP_SAVE)?;

        let id = self
            .service
            .save_account(&caller, &request.login, &request.secret, &request.info)
            .await?;
        Ok(SaveResponse { id: id.0 })
    }

    /// Updates one of the caller's accounts.
    ///
    /// # Errors
    ///
    /// `InvalidArgument`, `Unauthenticated`, `NotFound` (only when unmatched
    /// updates are rejected), `Cancelled` or `Internal`.
    pub async fn update(
        &self,
        ctx: &CallContext,
        request: UpdateRequest,
    ) -> Result<UpdateResponse, Status> {
        let id = AccountId::new(request.id);
        validate_update(id, &request.login, &request.secret)
            .map_err(|e| Error::invalid_argument(OP_UPDATE, e))?;
        let caller = ctx.caller(OP_UPDATE)?;

        self.service
            .update_account(&caller, id, &request.login, &request.secret, &request.info)
            .await?;
        Ok(UpdateResponse {})
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tracing::Span;

    use super::*;
    use crate::account::{SqliteAccountStore, StoreError};

    async fn handler() -> AccountsHandler<SqliteAccountStore> {
        let store = SqliteAccountStore::in_memory().await.unwrap();
        AccountsHandler::new(AccountService::new(store, Span::none()))
    }

    #[test]
    fn code_values() {
        assert_eq!(Code::Cancelled.as_i32(), 1);
        assert_eq!(Code::InvalidArgument.as_i32(), 3);
        assert_eq!(Code::NotFound.as_i32(), 5);
        assert_eq!(Code::Internal.as_i32(), 13);
        assert_eq!(Code::Unauthenticated.as_i32(), 16);
    }

    #[test]
    fn kinds_map_to_codes() {
        assert_eq!(Code::from(ErrorKind::Canceled), Code::Cancelled);
        assert_eq!(Code::from(ErrorKind::InvalidArgument), Code::InvalidArgument);
        assert_eq!(Code::from(ErrorKind::Unauthenticated), Code::Unauthenticated);
        assert_eq!(Code::from(ErrorKind::NotFound), Code::NotFound);
        assert_eq!(Code::from(ErrorKind::Internal), Code::Internal);
    }

    #[test]
    fn internal_status_hides_cause() {
        let err = Error::internal(
            OP_SAVE,
            StoreError::new("store.create", sqlx::Error::Protocol("INSERT INTO accounts".into())),
        );
        let status = Status::from(err);
        assert_eq!(status.code, Code::Internal);
        assert_eq!(status.message, "failed to save account");
        assert!(!status.to_string().contains("INSERT"));
    }

    #[test]
    fn anonymous_context_is_unauthenticated() {
        let err = CallContext::anonymous().caller(OP_GET_ALL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn save_request_info_defaults_to_empty() {
        let request: SaveRequest =
            serde_json::from_str(r#"{"login": "a@b.com", "secret": "pw"}"#).unwrap();
        assert_eq!(request, SaveRequest::new("a@b.com", "pw"));
    }

    #[tokio::test]
    async fn test_save_missing_login() {
        let handler = handler().await;
        let status = handler
            .save(&CallContext::authenticated(TenantId::new(7)), SaveRequest::new("", "pw"))
            .await
            .unwrap_err();
        assert_eq!(status, Status::new(Code::InvalidArgument, "login is required"));
    }

    #[tokio::test]
    async fn test_field_checks_run_before_tenant_check() {
        let handler = handler().await;
        let status = handler
            .update(&CallContext::anonymous(), UpdateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(status, Status::new(Code::InvalidArgument, "id is required"));
    }

    #[tokio::test]
    async fn test_update_missing_secret() {
        let handler = handler().await;
        let request = UpdateRequest {
            id: 1,
            login: "x".to_string(),
            ..UpdateRequest::default()
        };
        let status = handler
            .update(&CallContext::authenticated(TenantId::new(7)), request)
            .await
            .unwrap_err();
        assert_eq!(status, Status::new(Code::InvalidArgument, "secret is required"));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let handler = handler().await;
        let ctx = CallContext::authenticated(TenantId::new(7));

        let saved = handler
            .save(&ctx, SaveRequest::new("a@b.com", "pw").info("note"))
            .await
            .unwrap();
        assert_eq!(saved, SaveResponse { id: 1 });

        let all = handler.get_all(&ctx, GetAllRequest {}).await.unwrap();
        assert_eq!(
            all.accounts,
            vec![AccountRecord {
                id: 1,
                login: "a@b.com".to_string(),
                secret: "pw".to_string(),
                info: "note".to_string(),
            }]
        );
    }
}
