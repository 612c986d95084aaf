use serde::Serialize;

use sweetshop_core::UserId;

use crate::{Role, UserRecord};

/// The authenticated caller of a request.
///
/// Built from the stored user record at authentication time, so `role`
/// reflects the store rather than whatever the token claimed at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
    pub name: String,
}

impl From<&UserRecord> for Identity {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            role: user.role,
            name: user.name.clone(),
        }
    }
}
