use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_core::{StoreError, SweetId};

use crate::{Page, Sweet, SweetPatch, SweetQuery};

/// Outcome of an atomic stock mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockChange {
    /// Applied; carries the resulting quantity.
    Applied(i64),
    /// Not enough stock; nothing changed.
    Insufficient { available: i64 },
    /// Result would not fit the quantity type; nothing changed.
    Overflow,
    /// No such sweet.
    Missing,
}

/// Catalog store port.
///
/// `decrement` and `increment` must be atomic per row: the check and the write
/// happen as one step relative to every other writer of that sweet.
#[async_trait]
pub trait SweetStore: Send + Sync {
    async fn insert(&self, sweet: Sweet) -> Result<Sweet, StoreError>;

    async fn get(&self, id: SweetId) -> Result<Option<Sweet>, StoreError>;

    async fn list(&self, page: Page) -> Result<Vec<Sweet>, StoreError>;

    async fn search(&self, query: &SweetQuery) -> Result<Vec<Sweet>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Returns the updated record, or `None` if the id is unknown.
    async fn update(
        &self,
        id: SweetId,
        patch: &SweetPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Sweet>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: SweetId) -> Result<bool, StoreError>;

    async fn decrement(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError>;

    async fn increment(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError>;
}
