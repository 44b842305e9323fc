//! Core types and trait definitions for the subtrack subscription service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod memory;
pub mod month;
pub mod store;
pub mod subscription;

pub use error::{Error, Result};
pub use month::Month;
pub use subscription::{Invalid, Subscription};
