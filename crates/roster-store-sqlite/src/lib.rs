//! SQLite backend for the roster store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each command runs inside a single
//! SQLite transaction.

mod encode;
mod persons;
mod plans;
mod positions;
mod schema;
mod statuses;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
