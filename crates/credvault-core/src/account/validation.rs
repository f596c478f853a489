//! Account field validation.

use super::model::AccountId;

/// Validation error for caller-supplied account fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Account ID is missing (zero or negative).
    MissingId,
    /// Login is empty.
    EmptyLogin,
    /// Secret is empty.
    EmptySecret,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingId => "id is required",
            Self::EmptyLogin => "login is required",
            Self::EmptySecret => "secret is required",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingId => "id",
            Self::EmptyLogin => "login",
            Self::EmptySecret => "secret",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Validate the fields required to create or update an account.
///
/// The secret is opaque, so only emptiness is checked; whitespace is a
/// legal value for both fields. `info` has no constraint.
///
/// # Errors
///
/// Returns the first violated rule, checking `login` before `secret`.
pub const fn validate_fields(login: &str, secret: &str) -> Result<(), ValidationError> {
    if login.is_empty() {
        return Err(ValidationError::EmptyLogin);
    }
    if secret.is_empty() {
        return Err(ValidationError::EmptySecret);
    }
    Ok(())
}

/// Validate an update request.
///
/// Ids are assigned from 1, so anything below that can never name a row
/// and is treated as missing.
///
/// # Errors
///
/// Returns the first violated rule, checking `id`, then `login`, then `secret`.
pub const fn validate_update(id: AccountId, login: &str, secret: &str) -> Result<(), ValidationError> {
    if id.0 <= 0 {
        return Err(ValidationError::MissingId);
    }
    validate_fields(login, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_fields() {
        assert_eq!(validate_fields("a@b.com", "pw"), Ok(()));
    }

    #[test]
    fn empty_login() {
        assert_eq!(validate_fields("", "pw"), Err(ValidationError::EmptyLogin));
    }

    #[test]
    fn empty_secret() {
        assert_eq!(validate_fields("a@b.com", ""), Err(ValidationError::EmptySecret));
    }

    #[test]
    fn login_checked_before_secret() {
        assert_eq!(validate_fields("", ""), Err(ValidationError::EmptyLogin));
    }

    #[test]
    fn whitespace_is_not_empty() {
        assert_eq!(validate_fields(" ", " "), Ok(()));
    }

    #[test]
    fn update_requires_id() {
        assert_eq!(
            validate_update(AccountId::new(0), "", ""),
            Err(ValidationError::MissingId)
        );
        assert_eq!(
            validate_update(AccountId::new(-3), "x", "y"),
            Err(ValidationError::MissingId)
        );
        assert_eq!(validate_update(AccountId::new(1), "x", "y"), Ok(()));
    }

    #[test]
    fn messages_and_fields() {
        assert_eq!(ValidationError::EmptyLogin.message(), "login is required");
        assert_eq!(ValidationError::EmptySecret.field(), "secret");
        assert_eq!(ValidationError::MissingId.to_string(), "id is required");
    }
}
