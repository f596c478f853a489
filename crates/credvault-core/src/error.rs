//! Error types for account service operations.

use crate::account::{StoreError, ValidationError};

/// Category of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required caller-supplied field is missing or empty.
    InvalidArgument,
    /// No tenant identity accompanied the call.
    Unauthenticated,
    /// An update matched no account owned by the caller.
    NotFound,
    /// The call's deadline passed before the store answered. Reported as
    /// [`Code::Cancelled`](crate::api::Code::Cancelled) on the wire.
    Canceled,
    /// The store failed.
    Internal,
}

impl ErrorKind {
    /// Short lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not found",
            Self::Canceled => "canceled",
            Self::Internal => "internal error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying reason for an [`Error`].
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    /// Field validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// A failed account service operation.
///
/// Carries the kind, the operation that failed and, when there is one, the
/// cause. The cause is reachable through [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("{op}: {kind}")]
pub struct Error {
    kind: ErrorKind,
    op: &'static str,
    #[source]
    cause: Option<Cause>,
}

impl Error {
    /// Creates an error without a cause.
    #[must_use]
    pub const fn new(kind: ErrorKind, op: &'static str) -> Self {
        Self {
            kind,
            op,
            cause: None,
        }
    }

    /// Creates an error with a cause.
    #[must_use]
    pub fn with_cause(kind: ErrorKind, op: &'static str, cause: impl Into<Cause>) -> Self {
        Self {
            kind,
            op,
            cause: Some(cause.into()),
        }
    }

    pub(crate) fn invalid_argument(op: &'static str, err: ValidationError) -> Self {
        Self::with_cause(ErrorKind::InvalidArgument, op, err)
    }

    pub(crate) const fn unauthenticated(op: &'static str) -> Self {
        Self::new(ErrorKind::Unauthenticated, op)
    }

    pub(crate) const fn not_found(op: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, op)
    }

    pub(crate) const fn canceled(op: &'static str) -> Self {
        Self {
            kind: ErrorKind::Canceled,
            op,
            cause: Some(Cause::DeadlineExceeded),
        }
    }

    pub(crate) fn internal(op: &'static str, err: StoreError) -> Self {
        Self::with_cause(ErrorKind::Internal, op, err)
    }

    /// The kind of failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The service operation that failed.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        self.op
    }

    /// The cause, if any.
    #[must_use]
    pub const fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// The validation failure, if this is an `InvalidArgument` error.
    #[must_use]
    pub fn validation_error(&self) -> Option<ValidationError> {
        match &self.cause {
            Some(Cause::Validation(err)) => Some(*err),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
