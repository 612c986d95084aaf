//! Infrastructure layer: storage adapters and database wiring.

pub mod db;
pub mod store;

pub use store::memory::{InMemorySweetStore, InMemoryUserStore};
pub use store::postgres::{PostgresSweetStore, PostgresUserStore};

#[cfg(test)]
mod integration_tests;
