//! `sweetshop-core`: shared domain building blocks.
//!
//! Identifiers and error types used by every other crate. No IO lives here.

pub mod error;
pub mod id;

pub use error::{DomainError, StoreError};
pub use id::{SweetId, UserId};
