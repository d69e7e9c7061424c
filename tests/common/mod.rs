//! Shared test utilities for sift integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Every helper works against a fresh in-memory store
//! unless it says otherwise, and dates are pinned with [`today`] so
//! sliding-window output is deterministic.

pub mod assertions;
pub mod builders;
pub mod failing_store;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use failing_store::*;
pub use fixtures::*;
