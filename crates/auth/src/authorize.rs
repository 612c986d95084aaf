use thiserror::Error;

use crate::{Identity, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires {required} role")]
    Forbidden { required: Role, actual: Role },
}

/// Role gate. Callers must already hold an authenticated `Identity`.
pub fn require_role(identity: &Identity, role: Role) -> Result<(), AuthzError> {
    if identity.role != role {
        return Err(AuthzError::Forbidden {
            required: role,
            actual: identity.role,
        });
    }
    Ok(())
}
