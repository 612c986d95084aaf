//! `sweetshop-catalog`: the sweet catalog and its stock invariants.

pub mod error;
pub mod query;
pub mod service;
pub mod store;
pub mod sweet;

pub use error::CatalogError;
pub use query::{Page, SweetQuery};
pub use service::CatalogService;
pub use store::{StockChange, SweetStore};
pub use sweet::{NewSweet, Sweet, SweetPatch};
