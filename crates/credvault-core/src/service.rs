//! Account service.
//!
//! Mediates every account operation for a tenant: validates caller-supplied
//! fields, scopes the store call to the caller's tenant, enforces the call
//! deadline and folds failures into [`ErrorKind`]s.

use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::account::{
    Account, AccountId, AccountStore, StoreResult, validate_fields, validate_update,
};
use crate::config::ServiceOptions;
use crate::error::{Error, ErrorKind, Result};
use crate::tenant::Caller;

pub(crate) const OP_SAVE: &str = "accounts.save_account";
pub(crate) const OP_UPDATE: &str = "accounts.update_account";
pub(crate) const OP_GET_ALL: &str = "accounts.get_all";

/// Business logic for credential accounts.
///
/// Holds no per-call state; one instance serves any number of concurrent
/// calls for any tenant.
#[derive(Debug)]
pub struct AccountService<S> {
    store: S,
    span: Span,
    options: ServiceOptions,
}

impl<S: AccountStore> AccountService<S> {
    /// Creates a service over `store`.
    ///
    /// Every operation logs inside a child span of `span`.
    #[must_use]
    pub fn new(store: S, span: Span) -> Self {
        Self {
            store,
            span,
            options: ServiceOptions::default(),
        }
    }

    /// Replaces the service options.
    #[must_use]
    pub const fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates an account owned by the caller's tenant.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `login` or `secret` is empty (nothing is written)
    /// - `Canceled` if the deadline passes first
    /// - `Internal` if the store fails
    pub async fn save_account(
        &self,
        caller: &Caller,
        login: &str,
        secret: &str,
        info: &str,
    ) -> Result<AccountId> {
        let span = info_span!(
            parent: &self.span,
            "save_account",
            tenant = %caller.tenant(),
            login = %login
        );

        async move {
            info!("attempting to save account");

            let result = async {
                validate_fields(login, secret).map_err(|e| Error::invalid_argument(OP_SAVE, e))?;
                self.run(
                    OP_SAVE,
                    caller,
                    self.store.create(login, secret, info, caller.tenant()),
                )
                .await
            }
            .await;

            match &result {
                Ok(id) => info!(id = %id, "account saved successfully"),
                Err(err) => log_failure(err, "failed to save account"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Replaces login, secret and info of one of the caller's accounts.
    ///
    /// The store matches on both `id` and the caller's tenant, so another
    /// tenant's account is never touched. When nothing matches the call
    /// succeeds, unless [`ServiceOptions::reject_unmatched_updates`] is set.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` is missing or `login`/`secret` is empty
    /// - `NotFound` if nothing matched and unmatched updates are rejected
    /// - `Canceled` if the deadline passes first
    /// - `Internal` if the store fails
    pub async fn update_account(
        &self,
        caller: &Caller,
        id: AccountId,
        login: &str,
        secret: &str,
        info: &str,
    ) -> Result<()> {
        let span = info_span!(
            parent: &self.span,
            "update_account",
            tenant = %caller.tenant(),
            id = %id,
            login = %login
        );

        async move {
            info!("attempting to update account");

            let result = async {
                validate_update(id, login, secret)
                    .map_err(|e| Error::invalid_argument(OP_UPDATE, e))?;
                let affected = self
                    .run(
                        OP_UPDATE,
                        caller,
                        self.store.update(id, login, secret, info, caller.tenant()),
                    )
                    .await?;

                if affected == 0 {
                    warn!("no account matched id and owner");
                    if self.options.reject_unmatched_updates {
                        return Err(Error::not_found(OP_UPDATE));
                    }
                }
                Ok::<_, Error>(affected)
            }
            .await;

            match &result {
                Ok(affected) => info!(affected, "account updated successfully"),
                Err(err) => log_failure(err, "failed to update account"),
            }
            result.map(|_| ())
        }
        .instrument(span)
        .await
    }

    /// Returns every account owned by the caller's tenant.
    ///
    /// A tenant without accounts gets an empty list.
    ///
    /// # Errors
    ///
    /// - `Canceled` if the deadline passes first
    /// - `Internal` if the store fails
    pub async fn get_all(&self, caller: &Caller) -> Result<Vec<Account>> {
        let span = info_span!(parent: &self.span, "get_all", tenant = %caller.tenant());

        async move {
            info!("attempting to get all accounts");

            let result = self
                .run(OP_GET_ALL, caller, self.store.list_by_owner(caller.tenant()))
                .await;

            match &result {
                Ok(accounts) => info!(count = accounts.len(), "accounts fetched successfully"),
                Err(err) => log_failure(err, "failed to get all accounts"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Drives one store call under the caller's deadline.
    ///
    /// The store future is lazy; if the deadline has already passed it is
    /// dropped without ever being polled.
    async fn run<T>(
        &self,
        op: &'static str,
        caller: &Caller,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Result<T> {
        let deadline = caller.deadline().or_else(|| {
            self.options
                .request_timeout()
                .map(|timeout| Instant::now() + timeout)
        });

        let outcome = match deadline {
            Some(deadline) => {
                if Instant::now() >= deadline {
                    return Err(Error::canceled(op));
                }
                timeout_at(deadline, call)
                    .await
                    .map_err(|_| Error::canceled(op))?
            }
            None => call.await,
        };

        outcome.map_err(|e| Error::internal(op, e))
    }
}

fn log_failure(err: &Error, message: &str) {
    match err.kind() {
        ErrorKind::InvalidArgument | ErrorKind::NotFound => {
            warn!(kind = %err.kind(), cause = ?err.cause(), "{message}");
        }
        _ => error!(kind = %err.kind(), cause = ?err.cause(), "{message}"),
    }
}
