//! `UserStore` and `SweetStore` adapters.

pub mod memory;
pub mod postgres;
