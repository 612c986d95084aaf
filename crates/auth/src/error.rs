use thiserror::Error;

use sweetshop_core::{DomainError, StoreError};

use crate::{PasswordError, TokenValidationError};

/// Failure to turn a bearer token into an `Identity`.
///
/// Every variant means "unauthenticated" to callers; the variants exist so the
/// cause can be logged and tested.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(TokenValidationError),

    #[error("token has expired")]
    Expired,

    #[error("token subject no longer exists")]
    UnknownSubject,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TokenValidationError> for AuthError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other),
        }
    }
}

/// Failure of register/login.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("token signing failed: {0}")]
    Token(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(_) => CredentialError::DuplicateEmail,
            other => CredentialError::Store(other),
        }
    }
}

impl From<DomainError> for CredentialError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                CredentialError::Validation(msg)
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for CredentialError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        CredentialError::Token(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_its_own_kind() {
        assert_eq!(AuthError::from(TokenValidationError::Expired), AuthError::Expired);
        assert_eq!(
            AuthError::from(TokenValidationError::BadSignature),
            AuthError::InvalidToken(TokenValidationError::BadSignature)
        );
    }

    #[test]
    fn unique_violation_means_duplicate_email() {
        let err = CredentialError::from(StoreError::UniqueViolation("users_email_key".into()));
        assert_eq!(err, CredentialError::DuplicateEmail);
        let err = CredentialError::from(StoreError::Backend("down".into()));
        assert!(matches!(err, CredentialError::Store(_)));
    }

    #[test]
    fn domain_errors_are_validation_failures() {
        assert_eq!(
            CredentialError::from(DomainError::validation("name cannot be empty")),
            CredentialError::Validation("name cannot be empty".into())
        );
        assert_eq!(
            CredentialError::from(DomainError::invalid_id("UserId: bad")),
            CredentialError::Validation("UserId: bad".into())
        );
    }
}
