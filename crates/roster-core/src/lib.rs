//! Core types and trait definitions for the roster service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ordering;
pub mod person;
pub mod plan;
pub mod position;
pub mod resolver;
pub mod status;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
