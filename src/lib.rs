//! sift: build, save, categorize and re-apply structured searches.
//!
//! The library half of the binary: re-exports [`sift_core`] and exposes the
//! [`cli`] module so the integration harnesses can drive commands without
//! spawning a process.
//!
//! # Architecture
//!
//! ```text
//! cli ──► SearchRepository ──► KeyValueStore (JSON file)
//!  │            │
//!  └────────────┴──► query::compile
//! ```

pub mod cli;

pub use sift_core::*;
