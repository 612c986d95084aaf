//! User records and registration input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Stored record
// ─────────────────────────────────────────────────────────────────────────────

/// A user as persisted by the credential store.
///
/// Not serializable: the password hash must never cross the API boundary. Use
/// [`UserProfile`] for anything that leaves the core.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl core::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration input
// ─────────────────────────────────────────────────────────────────────────────

/// Registration request.
#[derive(Clone, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegisterUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        Ok(())
    }
}

/// Structural email check: `local@domain.tld`, no whitespace.
///
/// Emails are compared exactly (case-sensitive) as login keys, so no
/// normalization happens here.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::validation(format!("invalid email address: {email:?}"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: UserId::new(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn profile_json_never_carries_the_hash() {
        let profile = UserProfile::from(&record());
        let json = serde_json::to_value(&profile).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("password_hash"));
        assert_eq!(obj["email"], "test@example.com");
        assert_eq!(obj["role"], "USER");
    }

    #[test]
    fn record_debug_redacts_hash() {
        let out = format!("{:?}", record());
        assert!(!out.contains("secret"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn register_debug_omits_password() {
        let req = RegisterUser::new("A", "a@example.com", "hunter2");
        assert!(!format!("{req:?}").contains("hunter2"));
    }

    #[test]
    fn accepts_plain_addresses() {
        for ok in ["a@b.co", "first.last@sub.example.org", "Test@Example.com"] {
            assert!(validate_email(ok).is_ok(), "{ok} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@example.com", "a@", "a@b", "a@.com", "a@b.", "a b@c.com", "a@b@c.com"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn registration_requires_name_and_password() {
        assert!(RegisterUser::new("  ", "a@b.co", "pw").validate().is_err());
        assert!(RegisterUser::new("A", "a@b.co", "").validate().is_err());
        assert!(RegisterUser::new("A", "a@b.co", "pw").validate().is_ok());
    }
}
