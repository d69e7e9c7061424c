//! Test builders: ergonomic constructors for `NewSearch` inputs and seeded
//! repositories.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on store failures rather than returning
//! `Result`.

use sift_core::{FilterSpec, MemoryStore, NewSearch, SavedSearch, SearchRepository};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// NewSearchBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`NewSearch`] fixtures.
///
/// # Example
///
/// ```rust
/// let input = NewSearchBuilder::new("rust news")
///     .category("Tech")
///     .color("#ff00ff")
///     .keywords("rust")
///     .build();
/// ```
pub struct NewSearchBuilder {
    name: String,
    filters: FilterSpec,
    category: Option<String>,
    color: Option<String>,
}

impl NewSearchBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: FilterSpec::default(),
            category: None,
            color: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.filters.keywords = keywords.into();
        self
    }

    pub fn filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    /// The query is compiled from the filters, as the builder UI does.
    pub fn build(self) -> NewSearch {
        NewSearch {
            query: sift_core::compile(&self.filters),
            name: self.name,
            filters: self.filters,
            category: self.category,
            color: self.color,
            description: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Repository helpers
// ---------------------------------------------------------------------------

/// A repository over a fresh in-memory store, plus the store handle for
/// inspecting raw persisted values.
pub fn memory_repo() -> (SearchRepository, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (SearchRepository::new(store.clone()), store)
}

/// Save a search with only a name (and optional category).
pub async fn save_named(
    repo: &SearchRepository,
    name: &str,
    category: Option<&str>,
) -> SavedSearch {
    let mut builder = NewSearchBuilder::new(name).keywords(name);
    if let Some(category) = category {
        builder = builder.category(category);
    }
    repo.save_search(builder.build()).await.expect("save_search")
}

/// Save `count` searches named `search 0..count`, returning them in save
/// order (so the last one is at the front of the stored list).
pub async fn save_many(repo: &SearchRepository, count: usize) -> Vec<SavedSearch> {
    let mut saved = Vec::with_capacity(count);
    for i in 0..count {
        saved.push(save_named(repo, &format!("search {i}"), None).await);
    }
    saved
}

/// Ids of `searches` in order.
pub fn ids(searches: &[SavedSearch]) -> Vec<String> {
    searches.iter().map(|s| s.id.clone()).collect()
}
