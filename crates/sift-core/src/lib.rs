//! sift-core: saved-search core library.
//!
//! Two components make up the core: a query compiler that turns a structured
//! filter into the site's search syntax, and a repository that keeps saved
//! searches, categories and their colors consistent on top of an async
//! key-value store.
//!
//! # Architecture
//!
//! ```text
//! FilterSpec ──► query::compile ──► query string
//!                      ▲
//!                      │ (sliding-window redisplay only)
//! SearchRepository ────┘
//!        │
//!        ▼
//! dyn KeyValueStore  (MemoryStore | JsonFileStore | extension storage)
//! ```
//!
//! The repository never calls back into its caller and holds no state beyond
//! the store handle.

pub mod config;
pub mod error;
pub mod id;
pub mod query;
pub mod repository;
pub mod store;
pub mod types;

pub use error::{RepositoryError, Result, StoreError};
pub use id::generate_id;
pub use query::{compile, QueryBuilder};
pub use repository::{CategoryColors, SearchRepository};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreMap};
pub use types::{
    Category, DeleteOutcome, FilterSpec, NewSearch, RenameOutcome, SavedSearch, SearchUpdate,
    Settings, SettingsUpdate, SlidingWindow, DEFAULT_COLOR, UNCATEGORIZED,
};
