//! In-memory stores for tests and local development.
//!
//! Each store keeps its records behind one `RwLock`; every check-then-write
//! happens under the write guard, which gives the per-row atomicity the
//! store ports require.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_auth::{UserRecord, UserStore};
use sweetshop_catalog::{Page, StockChange, Sweet, SweetPatch, SweetQuery, SweetStore};
use sweetshop_core::{StoreError, SweetId, UserId};

fn poisoned() -> StoreError {
    StoreError::backend("in-memory store lock poisoned")
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| poisoned())
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| poisoned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut map = write(&self.inner)?;
        if map.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users.email".to_string()));
        }
        if map.contains_key(&user.id) {
            return Err(StoreError::UniqueViolation("users.id".to_string()));
        }
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let map = read(&self.inner)?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let map = read(&self.inner)?;
        Ok(map.get(&id).cloned())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sweets
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemorySweetStore {
    inner: RwLock<HashMap<SweetId, Sweet>>,
}

impl InMemorySweetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot in insertion order (`created_at`, then id).
    fn ordered(map: &HashMap<SweetId, Sweet>) -> Vec<Sweet> {
        let mut all: Vec<Sweet> = map.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }
}

#[async_trait]
impl SweetStore for InMemorySweetStore {
    async fn insert(&self, sweet: Sweet) -> Result<Sweet, StoreError> {
        let mut map = write(&self.inner)?;
        if map.contains_key(&sweet.id) {
            return Err(StoreError::UniqueViolation("sweets.id".to_string()));
        }
        map.insert(sweet.id, sweet.clone());
        Ok(sweet)
    }

    async fn get(&self, id: SweetId) -> Result<Option<Sweet>, StoreError> {
        Ok(read(&self.inner)?.get(&id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Sweet>, StoreError> {
        let map = read(&self.inner)?;
        let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        Ok(Self::ordered(&map).into_iter().skip(skip).take(limit).collect())
    }

    async fn search(&self, query: &SweetQuery) -> Result<Vec<Sweet>, StoreError> {
        let map = read(&self.inner)?;
        Ok(Self::ordered(&map)
            .into_iter()
            .filter(|s| query.matches(s))
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(read(&self.inner)?.len() as u64)
    }

    async fn update(
        &self,
        id: SweetId,
        patch: &SweetPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Sweet>, StoreError> {
        let mut map = write(&self.inner)?;
        Ok(map.get_mut(&id).map(|sweet| {
            patch.apply_to(sweet, now);
            sweet.clone()
        }))
    }

    async fn delete(&self, id: SweetId) -> Result<bool, StoreError> {
        Ok(write(&self.inner)?.remove(&id).is_some())
    }

    async fn decrement(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        let mut map = write(&self.inner)?;
        Ok(match map.get_mut(&id) {
            Some(sweet) => sweet.decrement(amount, now),
            None => StockChange::Missing,
        })
    }

    async fn increment(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        let mut map = write(&self.inner)?;
        Ok(match map.get_mut(&id) {
            Some(sweet) => sweet.increment(amount, now),
            None => StockChange::Missing,
        })
    }
}
