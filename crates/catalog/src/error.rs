use thiserror::Error;

use sweetshop_core::{DomainError, StoreError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("sweet not found")]
    NotFound,

    #[error("out of stock: requested {requested}, available {available}")]
    OutOfStock { requested: i64, available: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                CatalogError::Validation(msg)
            }
        }
    }
}
