//! SQLite backend for the Sumika building registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteRegistry;

#[cfg(test)]
mod tests;
