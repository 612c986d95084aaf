//! Catalog operations and stock mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use sweetshop_core::{StoreError, SweetId};

use crate::{CatalogError, NewSweet, Page, StockChange, Sweet, SweetPatch, SweetQuery, SweetStore};

/// Units taken by one purchase call.
pub const PURCHASE_UNITS: i64 = 1;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn SweetStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn SweetStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewSweet, now: DateTime<Utc>) -> Result<Sweet, CatalogError> {
        new.validate()?;
        let sweet = self.store.insert(new.into_sweet(SweetId::new(), now)).await?;
        info!(sweet_id = %sweet.id, quantity = sweet.quantity, "sweet created");
        Ok(sweet)
    }

    pub async fn get(&self, id: SweetId) -> Result<Sweet, CatalogError> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Sweet>, CatalogError> {
        Ok(self.store.list(page).await?)
    }

    pub async fn count(&self) -> Result<u64, CatalogError> {
        Ok(self.store.count().await?)
    }

    pub async fn search(&self, query: SweetQuery) -> Result<Vec<Sweet>, CatalogError> {
        let query = query.normalized();
        query.validate()?;
        if query.is_unsatisfiable() {
            return Ok(Vec::new());
        }
        Ok(self.store.search(&query).await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: SweetId,
        patch: SweetPatch,
        now: DateTime<Utc>,
    ) -> Result<Sweet, CatalogError> {
        patch.validate()?;
        let sweet = self
            .store
            .update(id, &patch, now)
            .await?
            .ok_or(CatalogError::NotFound)?;
        info!(sweet_id = %id, "sweet updated");
        Ok(sweet)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: SweetId) -> Result<(), CatalogError> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        info!(sweet_id = %id, "sweet deleted");
        Ok(())
    }

    /// Buy a single unit; returns the remaining quantity.
    pub async fn purchase(&self, id: SweetId, now: DateTime<Utc>) -> Result<i64, CatalogError> {
        self.purchase_units(id, PURCHASE_UNITS, now).await
    }

    /// Atomically take `units` from stock.
    #[instrument(skip(self))]
    pub async fn purchase_units(
        &self,
        id: SweetId,
        units: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, CatalogError> {
        if units <= 0 {
            return Err(CatalogError::validation("purchase quantity must be positive"));
        }
        match self.store.decrement(id, units, now).await? {
            StockChange::Applied(remaining) => {
                info!(sweet_id = %id, remaining, "purchase applied");
                Ok(remaining)
            }
            StockChange::Insufficient { available } => {
                debug!(sweet_id = %id, available, "purchase rejected: out of stock");
                Err(CatalogError::OutOfStock {
                    requested: units,
                    available,
                })
            }
            StockChange::Missing => Err(CatalogError::NotFound),
            StockChange::Overflow => Err(CatalogError::validation("quantity out of range")),
        }
    }

    /// Atomically add `amount` to stock; returns the new quantity.
    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, CatalogError> {
        if amount <= 0 {
            return Err(CatalogError::validation("restock amount must be positive"));
        }
        match self.store.increment(id, amount, now).await? {
            StockChange::Applied(quantity) => {
                info!(sweet_id = %id, quantity, "restock applied");
                Ok(quantity)
            }
            StockChange::Missing => Err(CatalogError::NotFound),
            StockChange::Overflow => {
                Err(CatalogError::validation("restock would overflow quantity"))
            }
            StockChange::Insufficient { .. } => Err(CatalogError::Store(StoreError::backend(
                "store reported insufficient stock on increment",
            ))),
        }
    }
}
