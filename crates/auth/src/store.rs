use async_trait::async_trait;

use sweetshop_core::{StoreError, UserId};

use crate::UserRecord;

/// Credential store port.
///
/// Adapters must enforce email uniqueness at write time and report a clash as
/// `StoreError::UniqueViolation`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError>;

    /// Exact, case-sensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
}
