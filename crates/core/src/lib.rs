//! Pure domain logic for the stockroom catalog backend.
//!
//! This crate has zero internal dependencies and performs no I/O.
//! Everything here is synchronous and unit-testable in isolation.

pub mod fallback;
pub mod import;
pub mod types;
